//! Conversation lifecycle status.
//!
//! A conversation is created `Active` and leaves that state exactly once.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// The lifecycle state of a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConversationStatus {
    /// Accepting turns.
    #[default]
    Active,

    /// Finished, either with full coverage or by hitting a budget.
    Completed,

    /// Cancelled by the caller or the user.
    Abandoned,

    /// Stopped after an unrecoverable provider issue.
    Error,
}

impl ConversationStatus {
    /// Returns true if the conversation still accepts turns.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Abandoned => "abandoned",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for ConversationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl StateMachine for ConversationStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use ConversationStatus::*;
        matches!(
            (self, target),
            (Active, Completed) | (Active, Abandoned) | (Active, Error)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ConversationStatus::*;
        match self {
            Active => vec![Completed, Abandoned, Error],
            Completed | Abandoned | Error => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [ConversationStatus; 4] = [
        ConversationStatus::Active,
        ConversationStatus::Completed,
        ConversationStatus::Abandoned,
        ConversationStatus::Error,
    ];

    #[test]
    fn default_status_is_active() {
        assert_eq!(ConversationStatus::default(), ConversationStatus::Active);
    }

    #[test]
    fn serializes_to_snake_case() {
        let json = serde_json::to_string(&ConversationStatus::Abandoned).unwrap();
        assert_eq!(json, "\"abandoned\"");
    }

    #[test]
    fn only_active_is_non_terminal() {
        for status in ALL {
            assert_eq!(status.is_terminal(), !status.is_active(), "{:?}", status);
        }
    }

    #[test]
    fn terminal_states_cannot_transition() {
        for from in ALL.into_iter().filter(|s| !s.is_active()) {
            for to in ALL {
                assert!(from.transition_to(to).is_err(), "{:?} -> {:?}", from, to);
            }
        }
    }

    #[test]
    fn active_cannot_transition_to_itself() {
        assert!(!ConversationStatus::Active.can_transition_to(&ConversationStatus::Active));
    }

    #[test]
    fn valid_transitions_matches_can_transition_to() {
        for status in ALL {
            for target in status.valid_transitions() {
                assert!(status.can_transition_to(&target));
            }
        }
    }
}
