//! Conversation domain module.
//!
//! Topic model, extraction schema, the conversation state machine, coverage
//! estimation, the completion predicate and prompt rendering. Everything
//! here is synchronous and performs no I/O.

mod completion;
mod config;
mod coverage;
mod errors;
mod message;
mod prompt;
mod schema;
mod state;
mod status;
mod templates;
mod topic;

pub use completion::{should_complete, should_complete_at, CompletionDecision, CompletionReason};
pub use config::{ConversationLimits, ConversationalFormConfig, Persona, PersonaStyle};
pub use coverage::{estimate_keyword_depth, estimate_value_depth};
pub use errors::{ConfigWarning, ConfigurationError, ConversationError};
pub use message::{Message, MessageRole};
pub use prompt::{build_system_prompt, initial_system_message, OPENING_INSTRUCTION};
pub use schema::{
    find_field, is_empty_value, missing_required_fields, validate_extractions,
    ExtractionSchemaField, Extractions, FieldType, FieldValidation, FieldViolation,
};
pub use state::{ConversationState, CoverageSummary};
pub use status::ConversationStatus;
pub use templates::{
    customer_feedback_template, it_helpdesk_template, TemplateCatalog, CUSTOMER_FEEDBACK,
    IT_HELPDESK,
};
pub use topic::{ConversationTopic, TargetDepth, TopicCoverage, TopicPriority};
