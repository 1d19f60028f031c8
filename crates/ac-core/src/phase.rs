// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The AgenticSession lifecycle phase and its transition DAG.

use serde::{Deserialize, Serialize};

/// Lifecycle phase of an `AgenticSession`, per the reconciler's state
/// machine. Transitions are checked against [`Phase::can_transition_to`]
/// everywhere the reconciler or API writes a new phase — this is the
/// function invariant 1 (no transition appears twice into a terminal
/// state; every observed sequence is a path in the DAG) is tested against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Phase {
    Pending,
    Creating,
    Running,
    Completed,
    Failed,
    Stopped,
    Error,
}

crate::simple_display! {
    Phase {
        Pending => "Pending",
        Creating => "Creating",
        Running => "Running",
        Completed => "Completed",
        Failed => "Failed",
        Stopped => "Stopped",
        Error => "Error",
    }
}

impl Phase {
    /// Terminal phases carry a result summary and never transition further,
    /// except that *Stopped* (not terminal) may resume back to *Creating*.
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Completed | Phase::Failed | Phase::Error)
    }

    /// True if `self -> next` is a legal edge in the phase transition DAG.
    pub fn can_transition_to(self, next: Phase) -> bool {
        use Phase::*;
        match (self, next) {
            (Pending, Creating) => true,
            (Creating, Running) => true,
            (Creating, Failed) => true,
            (Creating, Stopped) => true, // stop requested mid-provision
            (Running, Completed) => true,
            (Running, Failed) => true,
            (Running, Stopped) => true,
            (Stopped, Creating) => true, // resume
            // Any non-terminal phase may fall into Error when the reconciler
            // cannot make progress (missing Secret, quota exceeded, ...).
            (p, Error) if !p.is_terminal() => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_sequence_is_legal() {
        let path = [Phase::Pending, Phase::Creating, Phase::Running, Phase::Completed];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{:?} -> {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn stop_then_resume_then_running_is_legal() {
        let path = [Phase::Running, Phase::Stopped, Phase::Creating, Phase::Running];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]));
        }
    }

    #[test]
    fn terminal_phases_have_no_outgoing_edges() {
        for terminal in [Phase::Completed, Phase::Failed, Phase::Error] {
            for next in [
                Phase::Pending,
                Phase::Creating,
                Phase::Running,
                Phase::Completed,
                Phase::Failed,
                Phase::Stopped,
                Phase::Error,
            ] {
                assert!(!terminal.can_transition_to(next), "{:?} -> {:?} should be illegal", terminal, next);
            }
        }
    }

    #[test]
    fn pending_cannot_skip_to_running() {
        assert!(!Phase::Pending.can_transition_to(Phase::Running));
    }

    #[test]
    fn creating_can_fall_to_error_when_blocked() {
        assert!(Phase::Creating.can_transition_to(Phase::Error));
        assert!(Phase::Running.can_transition_to(Phase::Error));
    }

    #[cfg(feature = "test-support")]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn arb_phase() -> impl Strategy<Value = Phase> {
            prop_oneof![
                Just(Phase::Pending),
                Just(Phase::Creating),
                Just(Phase::Running),
                Just(Phase::Completed),
                Just(Phase::Failed),
                Just(Phase::Stopped),
                Just(Phase::Error),
            ]
        }

        proptest! {
            /// A terminal phase never has a legal outgoing edge, for any
            /// candidate next phase — the property behind invariant 1's
            /// "no transition appears twice into a terminal state".
            #[test]
            fn terminal_never_transitions(p in arb_phase(), next in arb_phase()) {
                if p.is_terminal() {
                    prop_assert!(!p.can_transition_to(next));
                }
            }
        }
    }
}
