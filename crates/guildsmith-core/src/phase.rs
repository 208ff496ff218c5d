//! Clone phase state machine
//!
//! Phases advance linearly with no backward transitions. Optional
//! phases (emojis, webhooks) may be skipped, so any forward jump along
//! the line is legal; every non-terminal phase may also drop into
//! `Failed` or `Cancelled`.

use serde::{Deserialize, Serialize};

/// Stages of a clone run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Operation accepted, snapshot not yet fetched
    Initializing,
    /// Creating the target workspace
    Creating,
    /// Cloning the role hierarchy
    Roles,
    /// Cloning categories and channels
    Channels,
    /// Cloning custom emojis
    Emojis,
    /// Cloning webhooks
    Webhooks,
    /// Applying cosmetic settings and minting an invite
    Finalizing,
    /// Terminal: clone finished
    Completed,
    /// Terminal: clone aborted by an error
    Failed,
    /// Terminal: clone aborted by cancellation
    Cancelled,
}

impl Phase {
    /// Check if the phase is terminal
    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Completed | Phase::Failed | Phase::Cancelled)
    }

    /// Progress percentage span covered by this phase
    ///
    /// Within a phase, progress is linear in the count of entities
    /// processed between the span's start and end.
    #[inline]
    #[must_use]
    pub fn progress_span(&self) -> (u8, u8) {
        match self {
            Phase::Initializing => (0, 0),
            Phase::Creating => (0, 15),
            Phase::Roles => (15, 40),
            Phase::Channels => (40, 70),
            Phase::Emojis => (70, 85),
            Phase::Webhooks => (85, 95),
            Phase::Finalizing => (95, 100),
            Phase::Completed => (100, 100),
            Phase::Failed | Phase::Cancelled => (0, 100),
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Phase::Initializing => "initializing",
            Phase::Creating => "creating",
            Phase::Roles => "roles",
            Phase::Channels => "channels",
            Phase::Emojis => "emojis",
            Phase::Webhooks => "webhooks",
            Phase::Finalizing => "finalizing",
            Phase::Completed => "completed",
            Phase::Failed => "failed",
            Phase::Cancelled => "cancelled",
        };
        write!(f, "{label}")
    }
}

/// Phase state machine errors
#[derive(Debug, thiserror::Error)]
pub enum PhaseError {
    /// Transition not in the allowed set
    #[error("illegal phase transition: {from} -> {to}")]
    IllegalTransition {
        /// Phase transitioned from
        from: Phase,
        /// Phase transitioned to
        to: Phase,
    },
}

/// Phases reachable from `from` in one transition
#[must_use]
pub fn allowed_transitions(from: Phase) -> Vec<Phase> {
    use Phase::*;
    match from {
        Initializing => vec![Creating, Failed, Cancelled],
        Creating => vec![Roles, Channels, Emojis, Webhooks, Finalizing, Failed, Cancelled],
        Roles => vec![Channels, Emojis, Webhooks, Finalizing, Failed, Cancelled],
        Channels => vec![Emojis, Webhooks, Finalizing, Failed, Cancelled],
        Emojis => vec![Webhooks, Finalizing, Failed, Cancelled],
        Webhooks => vec![Finalizing, Failed, Cancelled],
        Finalizing => vec![Completed, Failed, Cancelled],
        Completed | Failed | Cancelled => vec![],
    }
}

/// Validate a phase transition
///
/// # Errors
/// - `PhaseError::IllegalTransition` for backward jumps, transitions
///   out of a terminal phase, or a completion not reached through
///   `Finalizing`
pub fn validate_transition(from: Phase, to: Phase) -> Result<(), PhaseError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(PhaseError::IllegalTransition { from, to })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_path_is_legal() {
        let path = [
            Phase::Initializing,
            Phase::Creating,
            Phase::Roles,
            Phase::Channels,
            Phase::Emojis,
            Phase::Webhooks,
            Phase::Finalizing,
            Phase::Completed,
        ];

        for pair in path.windows(2) {
            assert!(validate_transition(pair[0], pair[1]).is_ok());
        }
    }

    #[test]
    fn optional_phases_can_be_skipped() {
        assert!(validate_transition(Phase::Creating, Phase::Channels).is_ok());
        assert!(validate_transition(Phase::Channels, Phase::Finalizing).is_ok());
        assert!(validate_transition(Phase::Roles, Phase::Finalizing).is_ok());
    }

    #[test]
    fn no_backward_transitions() {
        assert!(validate_transition(Phase::Channels, Phase::Roles).is_err());
        assert!(validate_transition(Phase::Finalizing, Phase::Creating).is_err());
    }

    #[test]
    fn terminal_phases_are_absorbing() {
        for terminal in [Phase::Completed, Phase::Failed, Phase::Cancelled] {
            assert!(terminal.is_terminal());
            assert!(allowed_transitions(terminal).is_empty());
        }
    }

    #[test]
    fn completion_only_through_finalizing() {
        assert!(validate_transition(Phase::Finalizing, Phase::Completed).is_ok());
        assert!(validate_transition(Phase::Channels, Phase::Completed).is_err());
        assert!(validate_transition(Phase::Webhooks, Phase::Completed).is_err());
    }

    #[test]
    fn progress_spans_cover_0_to_100() {
        assert_eq!(Phase::Creating.progress_span().0, 0);
        assert_eq!(Phase::Finalizing.progress_span().1, 100);

        // Adjacent working phases share their boundary.
        assert_eq!(
            Phase::Roles.progress_span().1,
            Phase::Channels.progress_span().0
        );
        assert_eq!(
            Phase::Webhooks.progress_span().1,
            Phase::Finalizing.progress_span().0
        );
    }
}
