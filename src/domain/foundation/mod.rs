//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers and error types that form the
//! vocabulary of the conversational form domain.

mod errors;
mod fraction;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use fraction::Fraction;
pub use ids::{ConversationId, FormId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
