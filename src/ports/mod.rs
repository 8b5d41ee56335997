//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `ConversationalLlm` - the language model conducting the dialogue
//! - `ConversationStore` - key-value persistence of conversation state
//! - `FormConfigSource` - read-only lookup of form configurations

mod conversation_store;
mod conversational_llm;
mod form_config_source;

pub use conversation_store::{ConversationStore, StoreError};
pub use conversational_llm::{ConversationalLlm, LlmReply, ProviderError};
pub use form_config_source::{FormConfigError, FormConfigSource};
