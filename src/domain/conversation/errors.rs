//! Error types for the conversation domain.

use std::fmt;

use super::status::ConversationStatus;

/// Form configuration is unusable; raised before any conversation starts.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum ConfigurationError {
    #[error("Schema field '{field}' references unknown topic '{topic_id}'")]
    UnknownTopic { field: String, topic_id: String },

    #[error("Duplicate topic id '{0}'")]
    DuplicateTopicId(String),

    #[error("Duplicate schema field '{0}'")]
    DuplicateField(String),

    #[error("Enum field '{field}' has no options")]
    EmptyEnumOptions { field: String },

    #[error("Field '{field}' has an invalid pattern: {reason}")]
    InvalidPattern { field: String, reason: String },

    #[error("Custom persona requires a custom prompt")]
    MissingCustomPrompt,

    #[error("Objective cannot be empty")]
    EmptyObjective,

    #[error("Invalid conversation limits: {0}")]
    InvalidLimits(String),
}

/// Design smell in a form configuration that does not block conversations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// A required field is not linked to any required-priority topic.
    RequiredFieldUnreachable { field: String },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::RequiredFieldUnreachable { field } => write!(
                f,
                "Required field '{}' is not linked to any required topic",
                field
            ),
        }
    }
}

/// Errors raised by conversation state transitions.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum ConversationError {
    /// The conversation already left the active state.
    #[error("Conversation is {status} and can no longer change")]
    TerminalState { status: ConversationStatus },

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_topic_names_field_and_topic() {
        let err = ConfigurationError::UnknownTopic {
            field: "issueCategory".to_string(),
            topic_id: "t9".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Schema field 'issueCategory' references unknown topic 't9'"
        );
    }

    #[test]
    fn terminal_state_names_status() {
        let err = ConversationError::TerminalState {
            status: ConversationStatus::Completed,
        };
        assert_eq!(err.to_string(), "Conversation is completed and can no longer change");
    }

    #[test]
    fn warning_displays_field() {
        let warning = ConfigWarning::RequiredFieldUnreachable {
            field: "urgency".to_string(),
        };
        assert!(warning.to_string().contains("'urgency'"));
    }
}
