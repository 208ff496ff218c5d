//! Remote workspace client boundary
//!
//! The transport itself (authentication, raw HTTP, rate-limit headers,
//! asset bytes) lives behind this trait and is out of scope here. The
//! orchestrator only ever awaits these calls, one at a time, gated by
//! the rate governor.

use crate::error::ClientError;
use async_trait::async_trait;
use guildsmith_types::{
    ChannelId, CreateChannelSpec, CreateEmojiSpec, CreateRoleSpec, CreateWebhookSpec,
    CreateWorkspaceSpec, EmojiId, InviteCode, RoleId, WebhookId, WorkspaceId, WorkspaceSettings,
    WorkspaceSnapshot,
};

/// Remote workspace API consumed by the clone orchestrator
#[async_trait]
pub trait WorkspaceClient: Send + Sync {
    /// Fetch the complete read-only description of a source workspace
    async fn fetch_snapshot(&self, source: WorkspaceId) -> Result<WorkspaceSnapshot, ClientError>;

    /// Create a fresh, empty target workspace
    async fn create_workspace(&self, spec: CreateWorkspaceSpec)
        -> Result<WorkspaceId, ClientError>;

    /// Delete a target workspace; cascades to all child entities
    async fn delete_workspace(&self, target: WorkspaceId) -> Result<(), ClientError>;

    /// Create one role in the target workspace
    async fn create_role(
        &self,
        target: WorkspaceId,
        spec: CreateRoleSpec,
    ) -> Result<RoleId, ClientError>;

    /// Create one channel or category in the target workspace
    async fn create_channel(
        &self,
        target: WorkspaceId,
        spec: CreateChannelSpec,
    ) -> Result<ChannelId, ClientError>;

    /// Create one custom emoji in the target workspace
    async fn create_emoji(
        &self,
        target: WorkspaceId,
        spec: CreateEmojiSpec,
    ) -> Result<EmojiId, ClientError>;

    /// Create one webhook bound to a target channel
    async fn create_webhook(
        &self,
        target: WorkspaceId,
        spec: CreateWebhookSpec,
    ) -> Result<WebhookId, ClientError>;

    /// Apply cosmetic settings to the target workspace
    async fn update_settings(
        &self,
        target: WorkspaceId,
        settings: WorkspaceSettings,
    ) -> Result<(), ClientError>;

    /// Mint an invite for a target channel; `None` when the API
    /// declines without an error
    async fn create_invite(
        &self,
        target: WorkspaceId,
        channel: ChannelId,
    ) -> Result<Option<InviteCode>, ClientError>;
}
