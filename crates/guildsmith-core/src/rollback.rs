//! Compensating rollback for failed or cancelled runs
//!
//! Every successfully created target entity is recorded before any
//! subsequent fallible step, so a crash mid-phase still knows
//! everything created so far. Rollback itself deletes the whole target
//! workspace: the cascade removes all child entities in one call,
//! which makes the granular log primarily diagnostic.

use crate::client::WorkspaceClient;
use crate::error::ClientError;
use guildsmith_types::{ChannelId, EmojiId, EntityKind, RoleId, WebhookId, WorkspaceId};

/// One entity successfully created in the target workspace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreatedEntity {
    /// A created role
    Role(RoleId),
    /// A created channel or category
    Channel(ChannelId),
    /// A created emoji
    Emoji(EmojiId),
    /// A created webhook
    Webhook(WebhookId),
}

impl CreatedEntity {
    /// Entity kind, for diagnostics
    #[inline]
    #[must_use]
    pub fn kind(&self) -> EntityKind {
        match self {
            CreatedEntity::Role(_) => EntityKind::Role,
            CreatedEntity::Channel(_) => EntityKind::Channel,
            CreatedEntity::Emoji(_) => EntityKind::Emoji,
            CreatedEntity::Webhook(_) => EntityKind::Webhook,
        }
    }
}

/// Append-only log of entities created in the target workspace
#[derive(Debug, Default)]
pub struct RollbackLog {
    entries: Vec<CreatedEntity>,
}

impl RollbackLog {
    /// Create an empty log
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful creation; called immediately after the
    /// create returns, before any subsequent fallible step
    pub fn record(&mut self, entity: CreatedEntity) {
        self.entries.push(entity);
    }

    /// Recorded entities in creation order
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[CreatedEntity] {
        &self.entries
    }

    /// Number of recorded entities
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing was created
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Count of recorded entities of one kind
    #[must_use]
    pub fn count_of(&self, kind: EntityKind) -> usize {
        self.entries.iter().filter(|e| e.kind() == kind).count()
    }
}

/// Best-effort compensating rollback
///
/// Deletes the target workspace if one was created; a no-op otherwise.
/// Deletion failures are logged and swallowed so the operation still
/// reports its original failure or cancellation reason.
pub async fn run_rollback(
    client: &dyn WorkspaceClient,
    target: Option<WorkspaceId>,
    log: &RollbackLog,
) {
    let Some(workspace) = target else {
        tracing::debug!("rollback skipped, target workspace was never created");
        return;
    };

    tracing::info!(
        %workspace,
        entities = log.len(),
        "rolling back target workspace"
    );

    match client.delete_workspace(workspace).await {
        Ok(()) => {
            tracing::info!(%workspace, "target workspace deleted");
        }
        Err(err) => {
            // Not retried: the operation reports its original error,
            // and the orphaned workspace is surfaced in the log.
            report_rollback_failure(workspace, &err);
        }
    }
}

fn report_rollback_failure(workspace: WorkspaceId, err: &ClientError) {
    tracing::error!(%workspace, error = %err, "rollback deletion failed");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_preserves_creation_order() {
        let mut log = RollbackLog::new();
        log.record(CreatedEntity::Role(RoleId(1)));
        log.record(CreatedEntity::Channel(ChannelId(2)));
        log.record(CreatedEntity::Channel(ChannelId(3)));

        assert_eq!(log.len(), 3);
        assert_eq!(log.entries()[0], CreatedEntity::Role(RoleId(1)));
        assert_eq!(log.count_of(EntityKind::Channel), 2);
        assert_eq!(log.count_of(EntityKind::Webhook), 0);
    }

    #[test]
    fn empty_log() {
        let log = RollbackLog::new();
        assert!(log.is_empty());
        assert_eq!(log.len(), 0);
    }
}
