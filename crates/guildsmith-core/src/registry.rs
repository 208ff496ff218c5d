//! Operation registry
//!
//! Tracks in-flight clone operations, enforces the concurrency
//! ceiling, and is the lookup point for status, cancel, and event
//! subscription. The registry never mutates clone state directly: a
//! cancel request only sets a flag that the owning orchestrator
//! observes at its next poll point.

use crate::client::WorkspaceClient;
use crate::config::CoreConfig;
use crate::error::RegistryError;
use crate::events::CloneEvent;
use crate::governor::RateGovernor;
use crate::operation::{CloneOperation, OperationHandle, OperationId, StatusSnapshot};
use crate::orchestrator::CloneOrchestrator;
use dashmap::DashMap;
use guildsmith_types::{CloneOptions, UserId, WorkspaceId};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

/// Registry of in-flight and recently finished clone operations
pub struct OperationRegistry {
    config: CoreConfig,
    client: Arc<dyn WorkspaceClient>,
    governor: Arc<RateGovernor>,
    active: DashMap<OperationId, Arc<OperationHandle>>,
    /// Serializes admission so the ceiling check and insert are atomic
    admission: Mutex<()>,
    /// Terminal snapshots kept for immediately-following status
    /// queries; evicted entries answer `NotFound`
    recent: Mutex<VecDeque<(OperationId, StatusSnapshot)>>,
}

impl OperationRegistry {
    /// Create a registry over a workspace client
    #[must_use]
    pub fn new(client: Arc<dyn WorkspaceClient>, config: CoreConfig) -> Arc<Self> {
        let governor = Arc::new(RateGovernor::new(Duration::from_millis(
            config.mutation_interval_ms,
        )));
        Arc::new(Self {
            config,
            client,
            governor,
            active: DashMap::new(),
            admission: Mutex::new(()),
            recent: Mutex::new(VecDeque::new()),
        })
    }

    /// Start a clone operation
    ///
    /// Fails fast at the concurrency ceiling rather than queuing. The
    /// orchestrator runs on its own task; callers observe it through
    /// `status` and `subscribe`.
    ///
    /// # Errors
    /// - `RegistryError::CapacityExceeded` when the ceiling is reached
    pub fn start(
        self: &Arc<Self>,
        source: WorkspaceId,
        requester: UserId,
        options: CloneOptions,
    ) -> Result<OperationId, RegistryError> {
        let op = {
            let _admission = self.admission.lock();
            if self.active.len() >= self.config.max_concurrent_ops {
                return Err(RegistryError::CapacityExceeded(
                    self.config.max_concurrent_ops,
                ));
            }
            let op = CloneOperation::new(source, requester, options, &self.config);
            self.active.insert(op.id(), Arc::clone(op.handle()));
            op
        };

        let id = op.id();
        tracing::info!(operation = %id, %source, %requester, "clone operation accepted");

        let registry = Arc::clone(self);
        let orchestrator =
            CloneOrchestrator::new(Arc::clone(&self.client), Arc::clone(&self.governor));
        tokio::spawn(async move {
            let finished = orchestrator.run(op).await;
            registry.retire(&finished);
        });

        Ok(id)
    }

    /// Point-in-time status of an active or recently finished operation
    ///
    /// # Errors
    /// - `RegistryError::NotFound` for unknown or evicted operations
    pub fn status(&self, id: OperationId) -> Result<StatusSnapshot, RegistryError> {
        if let Some(handle) = self.active.get(&id) {
            return Ok(handle.status());
        }

        self.recent
            .lock()
            .iter()
            .find(|(recent_id, _)| *recent_id == id)
            .map(|(_, snapshot)| *snapshot)
            .ok_or(RegistryError::NotFound(id))
    }

    /// Request cooperative cancellation
    ///
    /// Only sets the flag; the owning orchestrator performs the full
    /// rollback exactly as it would for any other mid-run failure.
    ///
    /// # Errors
    /// - `RegistryError::NotFound` if the operation is not active
    /// - `RegistryError::Unauthorized` if `requester` did not start it
    pub fn request_cancel(&self, id: OperationId, requester: UserId) -> Result<(), RegistryError> {
        let handle = self.active.get(&id).ok_or(RegistryError::NotFound(id))?;
        if handle.requester() != requester {
            return Err(RegistryError::Unauthorized(id));
        }

        tracing::info!(operation = %id, %requester, "cancellation requested");
        handle.request_cancel();
        Ok(())
    }

    /// Subscribe to an active operation's event stream
    ///
    /// Events are delivered at-most-once per transition with no
    /// replay; a late subscriber falls back to `status`.
    ///
    /// # Errors
    /// - `RegistryError::NotFound` if the operation is not active
    pub fn subscribe(
        &self,
        id: OperationId,
    ) -> Result<broadcast::Receiver<CloneEvent>, RegistryError> {
        self.active
            .get(&id)
            .map(|handle| handle.subscribe())
            .ok_or(RegistryError::NotFound(id))
    }

    /// Number of currently active operations
    #[inline]
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Move a terminal operation out of the active table, retaining
    /// its last snapshot in the bounded recent buffer
    fn retire(&self, finished: &CloneOperation) {
        self.active.remove(&finished.id());

        let snapshot = finished.handle().status();
        let mut recent = self.recent.lock();
        recent.push_back((finished.id(), snapshot));
        while recent.len() > self.config.recent_capacity {
            recent.pop_front();
        }

        tracing::debug!(
            operation = %finished.id(),
            phase = %snapshot.phase,
            "operation retired"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::Phase;
    use guildsmith_test_utils::MockWorkspaceClient;

    fn registry(config: CoreConfig) -> Arc<OperationRegistry> {
        OperationRegistry::new(Arc::new(MockWorkspaceClient::new()), config)
    }

    #[tokio::test]
    async fn status_of_unknown_operation_is_not_found() {
        let registry = registry(CoreConfig::default());
        let missing = OperationId::new();

        assert!(matches!(
            registry.status(missing),
            Err(RegistryError::NotFound(id)) if id == missing
        ));
    }

    #[tokio::test]
    async fn retire_moves_snapshot_to_recent_and_evicts() {
        let config = CoreConfig::default().with_recent_capacity(1);
        let registry = registry(config.clone());

        let first = CloneOperation::new(WorkspaceId(1), UserId(7), CloneOptions::new(), &config);
        let second = CloneOperation::new(WorkspaceId(2), UserId(7), CloneOptions::new(), &config);
        let first_id = first.id();
        let second_id = second.id();

        registry.retire(&first);
        assert_eq!(
            registry.status(first_id).unwrap().phase,
            Phase::Initializing
        );

        registry.retire(&second);
        assert!(registry.status(first_id).is_err());
        assert!(registry.status(second_id).is_ok());
    }

    #[tokio::test]
    async fn cancel_of_unknown_operation_is_not_found() {
        let registry = registry(CoreConfig::default());
        assert!(registry
            .request_cancel(OperationId::new(), UserId(7))
            .is_err());
    }
}
