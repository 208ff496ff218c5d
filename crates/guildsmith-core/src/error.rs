//! Error taxonomy for the replication engine
//!
//! Three layers:
//! - `ClientError` - returned by the remote workspace client boundary
//! - `RegistryError` - start/status/cancel failures, no operation state touched
//! - `CloneError` - operation-level aborts handled by the orchestrator
//!
//! Per-entity creation failures are not represented here: they are
//! contained inside the phase loops, logged, and skipped.

use crate::operation::OperationId;
use crate::phase::{Phase, PhaseError};
use guildsmith_types::SnapshotError;

/// Errors surfaced by the remote workspace client
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Remote API rejected the request
    #[error("api error (status {status}): {message}")]
    Api {
        /// HTTP-style status code
        status: u16,
        /// Remote error message
        message: String,
    },

    /// Remote API throttled the request
    #[error("rate limited by remote api")]
    RateLimited,

    /// Remote API unreachable; aborts the surrounding phase
    #[error("remote api unavailable: {0}")]
    Unavailable(String),
}

impl ClientError {
    /// Check whether this error aborts the whole phase rather than
    /// just the entity being cloned
    #[inline]
    #[must_use]
    pub fn is_phase_fatal(&self) -> bool {
        matches!(self, ClientError::Unavailable(_))
    }
}

/// Registry-level errors; no operation is created or mutated
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Concurrency ceiling reached; start fails fast, never queues
    #[error("capacity exceeded (max: {0})")]
    CapacityExceeded(usize),

    /// Unknown or already-evicted operation
    #[error("operation not found: {0}")]
    NotFound(OperationId),

    /// Cancel requested by someone other than the original requester
    #[error("cancel not authorized for operation {0}")]
    Unauthorized(OperationId),
}

/// Operation-level errors that abort a clone run
///
/// Every variant except `SourceUnavailable` and `CreationFailed` is
/// followed by a compensating rollback of the target workspace.
#[derive(Debug, thiserror::Error)]
pub enum CloneError {
    /// Snapshot fetch failed; aborts before any mutation
    #[error("source snapshot unavailable: {0}")]
    SourceUnavailable(#[source] ClientError),

    /// Snapshot violates structural invariants; aborts before any mutation
    #[error("invalid source snapshot: {0}")]
    InvalidSnapshot(#[from] SnapshotError),

    /// Target workspace creation failed; nothing exists to roll back
    #[error("target workspace creation failed: {0}")]
    CreationFailed(#[source] ClientError),

    /// A phase-level failure (client unavailable mid-phase)
    #[error("phase {phase} failed: {source}")]
    PhaseFailed {
        /// Phase that was running
        phase: Phase,
        /// Underlying client error
        source: ClientError,
    },

    /// Cooperative cancellation observed between entity clones
    #[error("cancelled during {phase}")]
    Cancelled {
        /// Phase at which the flag was observed
        phase: Phase,
    },

    /// Internal state machine violation
    #[error(transparent)]
    Phase(#[from] PhaseError),
}

impl CloneError {
    /// Check whether this abort happened before any mutation, in which
    /// case rollback is a no-op
    #[inline]
    #[must_use]
    pub fn is_pre_mutation(&self) -> bool {
        matches!(
            self,
            CloneError::SourceUnavailable(_)
                | CloneError::InvalidSnapshot(_)
                | CloneError::CreationFailed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_error_phase_fatality() {
        assert!(ClientError::Unavailable("down".to_string()).is_phase_fatal());
        assert!(!ClientError::RateLimited.is_phase_fatal());
        assert!(!ClientError::Api {
            status: 400,
            message: "bad name".to_string(),
        }
        .is_phase_fatal());
    }

    #[test]
    fn clone_error_display() {
        let err = CloneError::PhaseFailed {
            phase: Phase::Roles,
            source: ClientError::Unavailable("down".to_string()),
        };
        assert!(err.to_string().contains("phase roles failed"));
    }

    #[test]
    fn pre_mutation_classification() {
        let pre = CloneError::SourceUnavailable(ClientError::RateLimited);
        assert!(pre.is_pre_mutation());

        let mid = CloneError::Cancelled {
            phase: Phase::Channels,
        };
        assert!(!mid.is_pre_mutation());
    }
}
