//! Clone operation state
//!
//! A `CloneOperation` is exclusively owned by the orchestrator driving
//! it. The registry (and anyone asking for status) holds only the
//! shared `OperationHandle`, which exposes phase, progress, and the
//! cancellation flag but never mutates clone state.

use crate::config::CoreConfig;
use crate::events::{CloneEvent, EventChannel};
use crate::mapper::IdentityMapper;
use crate::phase::{validate_transition, Phase, PhaseError};
use crate::rollback::RollbackLog;
use chrono::{DateTime, Utc};
use guildsmith_types::{CloneOptions, UserId, WorkspaceId};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use ulid::Ulid;

/// Caller-visible operation identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OperationId(pub Ulid);

impl OperationId {
    /// Generate a new operation ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for OperationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OperationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Internal tracing token, one per run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorrelationId(pub Ulid);

impl CorrelationId {
    /// Generate a new correlation ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Point-in-time view of an operation, served by the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// Current (or terminal) phase
    pub phase: Phase,
    /// Overall progress, 0-100
    pub progress: u8,
    /// Whether cancellation has been requested
    pub cancel_requested: bool,
}

/// Shared lookup view of one operation
///
/// Held by the registry and status callers; phase and progress are
/// written only by the owning orchestrator, the cancel flag only by
/// the registry on an authorized request.
#[derive(Debug)]
pub struct OperationHandle {
    id: OperationId,
    requester: UserId,
    phase: Mutex<Phase>,
    progress: AtomicU8,
    cancel: AtomicBool,
    events: EventChannel,
}

impl OperationHandle {
    fn new(id: OperationId, requester: UserId, event_capacity: usize) -> Self {
        Self {
            id,
            requester,
            phase: Mutex::new(Phase::Initializing),
            progress: AtomicU8::new(0),
            cancel: AtomicBool::new(false),
            events: EventChannel::new(event_capacity),
        }
    }

    /// Operation ID
    #[inline]
    #[must_use]
    pub fn id(&self) -> OperationId {
        self.id
    }

    /// Original requester, the only principal allowed to cancel
    #[inline]
    #[must_use]
    pub fn requester(&self) -> UserId {
        self.requester
    }

    /// Current phase
    #[inline]
    #[must_use]
    pub fn phase(&self) -> Phase {
        *self.phase.lock()
    }

    /// Current progress percentage
    #[inline]
    #[must_use]
    pub fn progress(&self) -> u8 {
        self.progress.load(Ordering::SeqCst)
    }

    /// Whether cancellation has been requested
    #[inline]
    #[must_use]
    pub fn cancel_requested(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    /// Set the cancellation flag; the owning orchestrator observes it
    /// at the next poll point
    pub fn request_cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    /// Point-in-time status
    #[must_use]
    pub fn status(&self) -> StatusSnapshot {
        StatusSnapshot {
            phase: self.phase(),
            progress: self.progress(),
            cancel_requested: self.cancel_requested(),
        }
    }

    /// Attach an event subscriber
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CloneEvent> {
        self.events.subscribe()
    }

    pub(crate) fn publish(&self, event: CloneEvent) {
        self.events.publish(event);
    }

    pub(crate) fn set_phase(&self, phase: Phase) {
        *self.phase.lock() = phase;
    }

    /// Monotone progress update; a lower value never moves the bar
    /// backwards
    pub(crate) fn bump_progress(&self, percent: u8) -> u8 {
        let previous = self.progress.fetch_max(percent, Ordering::SeqCst);
        previous.max(percent)
    }
}

/// Mutable state of one in-flight clone run
///
/// Owned by exactly one orchestrator; everything here except the
/// shared handle is invisible to other components.
#[derive(Debug)]
pub struct CloneOperation {
    id: OperationId,
    correlation: CorrelationId,
    requester: UserId,
    source: WorkspaceId,
    options: CloneOptions,
    target_workspace: Option<WorkspaceId>,
    mapper: IdentityMapper,
    rollback_log: RollbackLog,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
    handle: Arc<OperationHandle>,
}

impl CloneOperation {
    /// Create a fresh operation in the `Initializing` phase
    #[must_use]
    pub fn new(
        source: WorkspaceId,
        requester: UserId,
        options: CloneOptions,
        config: &CoreConfig,
    ) -> Self {
        let id = OperationId::new();
        Self {
            id,
            correlation: CorrelationId::new(),
            requester,
            source,
            options,
            target_workspace: None,
            mapper: IdentityMapper::new(),
            rollback_log: RollbackLog::new(),
            started_at: Utc::now(),
            finished_at: None,
            handle: Arc::new(OperationHandle::new(id, requester, config.event_capacity)),
        }
    }

    /// Operation ID
    #[inline]
    #[must_use]
    pub fn id(&self) -> OperationId {
        self.id
    }

    /// Correlation ID for tracing
    #[inline]
    #[must_use]
    pub fn correlation(&self) -> CorrelationId {
        self.correlation
    }

    /// Original requester
    #[inline]
    #[must_use]
    pub fn requester(&self) -> UserId {
        self.requester
    }

    /// Source workspace being cloned
    #[inline]
    #[must_use]
    pub fn source(&self) -> WorkspaceId {
        self.source
    }

    /// Clone options for this run
    #[inline]
    #[must_use]
    pub fn options(&self) -> &CloneOptions {
        &self.options
    }

    /// Target workspace, once created
    #[inline]
    #[must_use]
    pub fn target_workspace(&self) -> Option<WorkspaceId> {
        self.target_workspace
    }

    pub(crate) fn set_target_workspace(&mut self, target: WorkspaceId) {
        self.target_workspace = Some(target);
    }

    /// ID translation tables
    #[inline]
    #[must_use]
    pub fn mapper(&self) -> &IdentityMapper {
        &self.mapper
    }

    pub(crate) fn mapper_mut(&mut self) -> &mut IdentityMapper {
        &mut self.mapper
    }

    /// Created-entity log
    #[inline]
    #[must_use]
    pub fn rollback_log(&self) -> &RollbackLog {
        &self.rollback_log
    }

    pub(crate) fn rollback_log_mut(&mut self) -> &mut RollbackLog {
        &mut self.rollback_log
    }

    /// When the operation was accepted
    #[inline]
    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// When the operation reached a terminal phase, if it has
    #[inline]
    #[must_use]
    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// Shared handle for registry lookup and event subscription
    #[inline]
    #[must_use]
    pub fn handle(&self) -> &Arc<OperationHandle> {
        &self.handle
    }

    /// Current phase
    #[inline]
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.handle.phase()
    }

    /// Whether cancellation has been requested
    #[inline]
    #[must_use]
    pub fn cancel_requested(&self) -> bool {
        self.handle.cancel_requested()
    }

    /// Advance the phase machine
    ///
    /// # Errors
    /// - `PhaseError::IllegalTransition` if the transition is not in
    ///   the allowed set
    pub fn transition(&mut self, to: Phase) -> Result<(), PhaseError> {
        let from = self.handle.phase();
        validate_transition(from, to)?;
        self.handle.set_phase(to);
        tracing::debug!(
            operation = %self.id,
            correlation = %self.correlation,
            %from,
            %to,
            "phase transition"
        );
        Ok(())
    }

    /// Raise progress to `percent`, monotonically
    pub fn set_progress(&mut self, percent: u8) {
        self.handle.bump_progress(percent.min(100));
    }

    /// Publish a progress event carrying the current phase and percent
    pub fn publish_progress(&self, message: impl Into<String>) {
        self.handle.publish(CloneEvent::Progress {
            phase: self.handle.phase(),
            percent: self.handle.progress(),
            message: message.into(),
        });
    }

    /// Publish a terminal event and stamp the finish time
    pub(crate) fn finish(&mut self, event: CloneEvent) {
        self.finished_at = Some(Utc::now());
        self.handle.publish(event);
    }
}
