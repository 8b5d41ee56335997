//! Storage Adapters
//!
//! Implementations of the ConversationStore port.
//!
//! - **FileConversationStore** - one YAML file per conversation
//! - **InMemoryConversationStore** - process-local map (testing/development)

mod file_conversation_store;
mod in_memory_conversation_store;

pub use file_conversation_store::FileConversationStore;
pub use in_memory_conversation_store::InMemoryConversationStore;
