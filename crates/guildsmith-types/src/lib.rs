//! Data model for the Guildsmith replication engine
//!
//! Defines the read-only description of a source workspace and the
//! creation specs sent to the remote workspace client:
//! - Typed snowflake identifiers
//! - Permission bitsets and overwrites
//! - Workspace snapshots (roles, channels, emojis, webhooks)
//! - Creation specs and clone options

#![warn(missing_docs)]

mod id;
mod options;
mod permissions;
mod snapshot;
mod spec;

pub use id::{ChannelId, EmojiId, InviteCode, RoleId, SubjectId, UserId, WebhookId, WorkspaceId};
pub use options::CloneOptions;
pub use permissions::{PermissionBits, PermissionOverwrite};
pub use snapshot::{
    ChannelKind, ChannelSnapshot, EmojiSnapshot, RoleSnapshot, SnapshotError, WebhookSnapshot,
    WorkspaceSnapshot,
};
pub use spec::{
    CreateChannelSpec, CreateEmojiSpec, CreateRoleSpec, CreateWebhookSpec, CreateWorkspaceSpec,
    EntityKind, WorkspaceSettings,
};
