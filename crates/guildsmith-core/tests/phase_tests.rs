use guildsmith_core::{allowed_transitions, validate_transition, Phase};
use proptest::prelude::*;

const ALL_PHASES: [Phase; 10] = [
    Phase::Initializing,
    Phase::Creating,
    Phase::Roles,
    Phase::Channels,
    Phase::Emojis,
    Phase::Webhooks,
    Phase::Finalizing,
    Phase::Completed,
    Phase::Failed,
    Phase::Cancelled,
];

const WORKING_PHASES: [Phase; 7] = [
    Phase::Initializing,
    Phase::Creating,
    Phase::Roles,
    Phase::Channels,
    Phase::Emojis,
    Phase::Webhooks,
    Phase::Finalizing,
];

fn rank(phase: Phase) -> usize {
    WORKING_PHASES
        .iter()
        .position(|p| *p == phase)
        .unwrap_or(WORKING_PHASES.len())
}

#[test]
fn test_initializing_transitions() {
    assert!(validate_transition(Phase::Initializing, Phase::Creating).is_ok());
    assert!(validate_transition(Phase::Initializing, Phase::Failed).is_ok());
    assert!(validate_transition(Phase::Initializing, Phase::Cancelled).is_ok());

    // Invalid: no work can be skipped past before the target exists
    assert!(validate_transition(Phase::Initializing, Phase::Roles).is_err());
    assert!(validate_transition(Phase::Initializing, Phase::Completed).is_err());
}

#[test]
fn test_optional_phases_skippable() {
    assert!(validate_transition(Phase::Channels, Phase::Finalizing).is_ok());
    assert!(validate_transition(Phase::Channels, Phase::Webhooks).is_ok());
    assert!(validate_transition(Phase::Roles, Phase::Emojis).is_ok());
    assert!(validate_transition(Phase::Creating, Phase::Finalizing).is_ok());
}

#[test]
fn test_completed_only_from_finalizing() {
    for from in WORKING_PHASES {
        let result = validate_transition(from, Phase::Completed);
        if from == Phase::Finalizing {
            assert!(result.is_ok());
        } else {
            assert!(result.is_err(), "{from} must not complete directly");
        }
    }
}

#[test]
fn test_terminal_phases_absorbing() {
    for terminal in [Phase::Completed, Phase::Failed, Phase::Cancelled] {
        assert!(terminal.is_terminal());
        for to in ALL_PHASES {
            assert!(validate_transition(terminal, to).is_err());
        }
    }
}

#[test]
fn test_every_working_phase_can_fail_or_cancel() {
    for from in WORKING_PHASES {
        assert!(validate_transition(from, Phase::Failed).is_ok());
        assert!(validate_transition(from, Phase::Cancelled).is_ok());
    }
}

#[test]
fn test_working_spans_tile_the_percentage_line() {
    for pair in WORKING_PHASES[1..].windows(2) {
        let (_, end) = pair[0].progress_span();
        let (start, _) = pair[1].progress_span();
        assert_eq!(end, start, "{} and {} must share a boundary", pair[0], pair[1]);
    }
    assert_eq!(Phase::Creating.progress_span().0, 0);
    assert_eq!(Phase::Finalizing.progress_span().1, 100);
}

proptest! {
    #[test]
    fn prop_validation_agrees_with_allowed_set(
        from in prop::sample::select(ALL_PHASES.as_slice()),
        to in prop::sample::select(ALL_PHASES.as_slice()),
    ) {
        let result = validate_transition(from, to);
        let allowed = allowed_transitions(from);

        if result.is_ok() {
            prop_assert!(allowed.contains(&to));
        } else {
            prop_assert!(!allowed.contains(&to));
        }
    }

    #[test]
    fn prop_no_backward_transitions(
        from in prop::sample::select(WORKING_PHASES.as_slice()),
        to in prop::sample::select(WORKING_PHASES.as_slice()),
    ) {
        if validate_transition(from, to).is_ok() {
            prop_assert!(rank(to) > rank(from));
        }
    }

    #[test]
    fn prop_terminals_unreachable_except_failure_paths(
        from in prop::sample::select(ALL_PHASES.as_slice()),
    ) {
        for to in allowed_transitions(from) {
            if to == Phase::Completed {
                prop_assert_eq!(from, Phase::Finalizing);
            }
            prop_assert!(!from.is_terminal());
        }
    }
}
