//! Source-ID to target-ID translation tables
//!
//! Scoped to a single clone operation. Mappings are append-only: a
//! second record for the same source ID is a no-op, never an
//! overwrite, because permission translation for later-cloned channels
//! depends on role mappings recorded earlier in the same run.

use guildsmith_types::{ChannelId, RoleId};
use std::collections::HashMap;

/// Per-operation ID translation tables for roles and channels
#[derive(Debug, Default)]
pub struct IdentityMapper {
    roles: HashMap<RoleId, RoleId>,
    channels: HashMap<ChannelId, ChannelId>,
}

impl IdentityMapper {
    /// Create empty tables
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a role mapping; idempotent, first write wins
    pub fn record_role(&mut self, source: RoleId, target: RoleId) {
        self.roles.entry(source).or_insert(target);
    }

    /// Record a channel mapping; idempotent, first write wins
    pub fn record_channel(&mut self, source: ChannelId, target: ChannelId) {
        self.channels.entry(source).or_insert(target);
    }

    /// Look up the target role for a source role, O(1)
    #[inline]
    #[must_use]
    pub fn map_role(&self, source: RoleId) -> Option<RoleId> {
        self.roles.get(&source).copied()
    }

    /// Look up the target channel for a source channel, O(1)
    #[inline]
    #[must_use]
    pub fn map_channel(&self, source: ChannelId) -> Option<ChannelId> {
        self.channels.get(&source).copied()
    }

    /// Number of recorded role mappings
    #[inline]
    #[must_use]
    pub fn role_count(&self) -> usize {
        self.roles.len()
    }

    /// Number of recorded channel mappings
    #[inline]
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}
