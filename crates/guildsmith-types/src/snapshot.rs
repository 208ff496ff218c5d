//! Read-only description of a source workspace
//!
//! A snapshot is fetched once at the start of a clone run and never
//! mutated. Structural invariants:
//! - Categories are never nested
//! - A non-category channel's parent, when present, references a
//!   category in the same snapshot

use crate::id::{ChannelId, EmojiId, RoleId, WebhookId, WorkspaceId};
use crate::permissions::{PermissionBits, PermissionOverwrite};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Structural errors detected in a source snapshot
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// A category carries a parent reference
    #[error("category {0} has a parent")]
    NestedCategory(ChannelId),

    /// A channel references a parent that is missing or not a category
    #[error("channel {channel} references unknown category {parent}")]
    DanglingParent {
        /// Channel with the bad reference
        channel: ChannelId,
        /// The missing or non-category parent
        parent: ChannelId,
    },
}

/// Channel kinds understood by the cloner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    /// Text channel
    Text,
    /// Voice channel
    Voice,
    /// Category grouping other channels
    Category,
}

/// One role, ordered by hierarchy position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSnapshot {
    /// Source role identifier
    pub id: RoleId,
    /// Display name
    pub name: String,
    /// Workspace-level permission bitset
    pub permissions: PermissionBits,
    /// Display color (0 = none)
    pub color: u32,
    /// Shown separately in the member list
    pub hoist: bool,
    /// Mentionable by everyone
    pub mentionable: bool,
    /// Hierarchy position (higher = more senior)
    pub position: i32,
}

/// One channel, including its permission overwrites
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSnapshot {
    /// Source channel identifier
    pub id: ChannelId,
    /// Display name
    pub name: String,
    /// Text, voice, or category
    pub kind: ChannelKind,
    /// Position within its parent
    pub position: i32,
    /// Owning category, if any
    pub parent_id: Option<ChannelId>,
    /// Topic (text channels)
    pub topic: Option<String>,
    /// Bitrate in bps (voice channels)
    pub bitrate: Option<u32>,
    /// Member cap (voice channels)
    pub user_limit: Option<u16>,
    /// Permission overwrites keyed by role or user
    pub overwrites: Vec<PermissionOverwrite>,
}

impl ChannelSnapshot {
    /// Check if this channel is a category
    #[inline]
    #[must_use]
    pub fn is_category(&self) -> bool {
        self.kind == ChannelKind::Category
    }
}

/// One custom emoji
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmojiSnapshot {
    /// Source emoji identifier
    pub id: EmojiId,
    /// Emoji name
    pub name: String,
    /// Image location; asset transport happens behind the client
    pub image_url: String,
    /// Animated emoji
    pub animated: bool,
}

/// One webhook, bound to a source channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookSnapshot {
    /// Source webhook identifier
    pub id: WebhookId,
    /// Webhook name
    pub name: String,
    /// Channel the webhook posts to
    pub channel_id: ChannelId,
    /// Avatar location, if any
    pub avatar_url: Option<String>,
}

/// Complete read-only view of a source workspace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceSnapshot {
    /// Source workspace identifier
    pub id: WorkspaceId,
    /// Workspace name
    pub name: String,
    /// Icon location, if any
    pub icon_url: Option<String>,
    /// Roles ordered by hierarchy position
    pub roles: Vec<RoleSnapshot>,
    /// All channels, categories included
    pub channels: Vec<ChannelSnapshot>,
    /// Custom emojis
    pub emojis: Vec<EmojiSnapshot>,
    /// Webhooks bound to channels
    pub webhooks: Vec<WebhookSnapshot>,
}

impl WorkspaceSnapshot {
    /// Create an empty snapshot with just identity
    #[inline]
    #[must_use]
    pub fn new(id: WorkspaceId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            icon_url: None,
            roles: Vec::new(),
            channels: Vec::new(),
            emojis: Vec::new(),
            webhooks: Vec::new(),
        }
    }

    /// Categories in snapshot order
    pub fn categories(&self) -> impl Iterator<Item = &ChannelSnapshot> {
        self.channels.iter().filter(|c| c.is_category())
    }

    /// Non-category channels in snapshot order
    pub fn leaf_channels(&self) -> impl Iterator<Item = &ChannelSnapshot> {
        self.channels.iter().filter(|c| !c.is_category())
    }

    /// Validate structural invariants
    ///
    /// # Errors
    /// - `SnapshotError::NestedCategory` if a category has a parent
    /// - `SnapshotError::DanglingParent` if a channel references a
    ///   parent that is missing or not a category
    pub fn validate(&self) -> Result<(), SnapshotError> {
        let category_ids: HashSet<ChannelId> =
            self.categories().map(|c| c.id).collect();

        for channel in &self.channels {
            match channel.parent_id {
                Some(_) if channel.is_category() => {
                    return Err(SnapshotError::NestedCategory(channel.id));
                }
                Some(parent) if !category_ids.contains(&parent) => {
                    return Err(SnapshotError::DanglingParent {
                        channel: channel.id,
                        parent,
                    });
                }
                _ => {}
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(id: u64, kind: ChannelKind, parent: Option<u64>) -> ChannelSnapshot {
        ChannelSnapshot {
            id: ChannelId(id),
            name: format!("chan-{id}"),
            kind,
            position: 0,
            parent_id: parent.map(ChannelId),
            topic: None,
            bitrate: None,
            user_limit: None,
            overwrites: Vec::new(),
        }
    }

    #[test]
    fn validate_accepts_flat_hierarchy() {
        let mut snap = WorkspaceSnapshot::new(WorkspaceId(1), "src");
        snap.channels = vec![
            channel(10, ChannelKind::Category, None),
            channel(11, ChannelKind::Text, Some(10)),
            channel(12, ChannelKind::Voice, None),
        ];

        assert!(snap.validate().is_ok());
    }

    #[test]
    fn validate_rejects_nested_category() {
        let mut snap = WorkspaceSnapshot::new(WorkspaceId(1), "src");
        snap.channels = vec![
            channel(10, ChannelKind::Category, None),
            channel(11, ChannelKind::Category, Some(10)),
        ];

        assert!(matches!(
            snap.validate(),
            Err(SnapshotError::NestedCategory(ChannelId(11)))
        ));
    }

    #[test]
    fn validate_rejects_dangling_parent() {
        let mut snap = WorkspaceSnapshot::new(WorkspaceId(1), "src");
        snap.channels = vec![channel(11, ChannelKind::Text, Some(99))];

        assert!(matches!(
            snap.validate(),
            Err(SnapshotError::DanglingParent {
                channel: ChannelId(11),
                parent: ChannelId(99),
            })
        ));
    }

    #[test]
    fn category_iterators_partition_channels() {
        let mut snap = WorkspaceSnapshot::new(WorkspaceId(1), "src");
        snap.channels = vec![
            channel(10, ChannelKind::Category, None),
            channel(11, ChannelKind::Text, Some(10)),
            channel(12, ChannelKind::Voice, None),
        ];

        assert_eq!(snap.categories().count(), 1);
        assert_eq!(snap.leaf_channels().count(), 2);
    }
}
