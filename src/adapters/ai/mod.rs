//! AI Adapters.
//!
//! Implementations of the ConversationalLlm port. Real provider clients are
//! supplied by the embedding application.
//!
//! - `MockLlm` - scripted replies for tests and local runs

mod mock_llm;

pub use mock_llm::{MockLlm, RecordedCall, DEFAULT_MOCK_REPLY};
