//! Adapters - Implementations of port interfaces.
//!
//! - `ai` - conversational LLM implementations
//! - `forms` - form configuration sources
//! - `storage` - conversation stores (in-memory, YAML files)

pub mod ai;
pub mod forms;
pub mod storage;

pub use ai::MockLlm;
pub use forms::InMemoryFormConfigSource;
pub use storage::{FileConversationStore, InMemoryConversationStore};
