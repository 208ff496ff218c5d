//! Creation specs sent to the remote workspace client
//!
//! Each spec is derived from a source snapshot entity with IDs remapped
//! into the target workspace's ID space.

use crate::id::ChannelId;
use crate::permissions::{PermissionBits, PermissionOverwrite};
use crate::snapshot::{ChannelKind, ChannelSnapshot, EmojiSnapshot, RoleSnapshot, WebhookSnapshot};
use serde::{Deserialize, Serialize};

/// Kinds of entities the cloner creates, for the rollback log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A role
    Role,
    /// A channel or category
    Channel,
    /// A custom emoji
    Emoji,
    /// A webhook
    Webhook,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            EntityKind::Role => "role",
            EntityKind::Channel => "channel",
            EntityKind::Emoji => "emoji",
            EntityKind::Webhook => "webhook",
        };
        write!(f, "{label}")
    }
}

/// Spec for creating the target workspace itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateWorkspaceSpec {
    /// Name of the new workspace
    pub name: String,
    /// Icon location carried over from the source, if any
    pub icon_url: Option<String>,
}

impl CreateWorkspaceSpec {
    /// Create a new workspace spec
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            icon_url: None,
        }
    }

    /// With icon
    #[inline]
    #[must_use]
    pub fn with_icon(mut self, icon_url: impl Into<String>) -> Self {
        self.icon_url = Some(icon_url.into());
        self
    }
}

/// Spec for creating one role in the target workspace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRoleSpec {
    /// Role name
    pub name: String,
    /// Workspace-level permission bitset, copied verbatim
    pub permissions: PermissionBits,
    /// Display color
    pub color: u32,
    /// Shown separately in the member list
    pub hoist: bool,
    /// Mentionable by everyone
    pub mentionable: bool,
}

impl From<&RoleSnapshot> for CreateRoleSpec {
    fn from(role: &RoleSnapshot) -> Self {
        Self {
            name: role.name.clone(),
            permissions: role.permissions,
            color: role.color,
            hoist: role.hoist,
            mentionable: role.mentionable,
        }
    }
}

/// Spec for creating one channel in the target workspace
///
/// `parent` and `overwrites` are already remapped into the target ID
/// space by the orchestrator before the spec is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateChannelSpec {
    /// Channel name
    pub name: String,
    /// Text, voice, or category
    pub kind: ChannelKind,
    /// Position within its parent
    pub position: i32,
    /// Target-space parent category, if any
    pub parent: Option<ChannelId>,
    /// Topic (text channels)
    pub topic: Option<String>,
    /// Bitrate in bps (voice channels)
    pub bitrate: Option<u32>,
    /// Member cap (voice channels)
    pub user_limit: Option<u16>,
    /// Target-space permission overwrites
    pub overwrites: Vec<PermissionOverwrite>,
}

impl CreateChannelSpec {
    /// Build from a source channel with remapped parent and overwrites
    #[must_use]
    pub fn from_snapshot(
        channel: &ChannelSnapshot,
        parent: Option<ChannelId>,
        overwrites: Vec<PermissionOverwrite>,
    ) -> Self {
        Self {
            name: channel.name.clone(),
            kind: channel.kind,
            position: channel.position,
            parent,
            topic: channel.topic.clone(),
            bitrate: channel.bitrate,
            user_limit: channel.user_limit,
            overwrites,
        }
    }
}

/// Spec for creating one emoji in the target workspace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateEmojiSpec {
    /// Emoji name
    pub name: String,
    /// Image location; the client fetches the bytes
    pub image_url: String,
    /// Animated emoji
    pub animated: bool,
}

impl From<&EmojiSnapshot> for CreateEmojiSpec {
    fn from(emoji: &EmojiSnapshot) -> Self {
        Self {
            name: emoji.name.clone(),
            image_url: emoji.image_url.clone(),
            animated: emoji.animated,
        }
    }
}

/// Spec for creating one webhook, bound to a target channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateWebhookSpec {
    /// Webhook name
    pub name: String,
    /// Target-space channel the webhook posts to
    pub channel: ChannelId,
    /// Avatar location, if any
    pub avatar_url: Option<String>,
}

impl CreateWebhookSpec {
    /// Build from a source webhook with a remapped channel
    #[must_use]
    pub fn from_snapshot(webhook: &WebhookSnapshot, channel: ChannelId) -> Self {
        Self {
            name: webhook.name.clone(),
            channel,
            avatar_url: webhook.avatar_url.clone(),
        }
    }
}

/// Cosmetic settings applied to the target during finalization
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceSettings {
    /// New workspace name, if changed
    pub name: Option<String>,
    /// Icon location, if any
    pub icon_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::RoleId;

    #[test]
    fn role_spec_copies_bits_verbatim() {
        let role = RoleSnapshot {
            id: RoleId(5),
            name: "mods".to_string(),
            permissions: PermissionBits::new(0xdead),
            color: 0xff00ff,
            hoist: true,
            mentionable: false,
            position: 3,
        };

        let spec = CreateRoleSpec::from(&role);
        assert_eq!(spec.permissions, PermissionBits::new(0xdead));
        assert_eq!(spec.name, "mods");
        assert!(spec.hoist);
    }

    #[test]
    fn entity_kind_labels() {
        assert_eq!(EntityKind::Role.to_string(), "role");
        assert_eq!(EntityKind::Webhook.to_string(), "webhook");
    }
}
