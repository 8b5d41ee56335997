//! Conversation Store Port - persistence for conversation state.
//!
//! A key-value store of `ConversationState` keyed by conversation id. The
//! store does not merge concurrent writes; callers serialize writers per id.

use async_trait::async_trait;

use crate::domain::conversation::ConversationState;
use crate::domain::foundation::ConversationId;

/// Errors that can occur during conversation storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to serialize conversation: {0}")]
    SerializationFailed(String),

    #[error("Failed to deserialize conversation: {0}")]
    DeserializationFailed(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Port for persisting and loading conversations.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Loads a conversation, `None` if it was never saved.
    async fn load(&self, id: ConversationId) -> Result<Option<ConversationState>, StoreError>;

    /// Saves a conversation, replacing any previous version.
    async fn save(&self, state: &ConversationState) -> Result<(), StoreError>;

    /// Removes a conversation. Deleting a missing id is not an error.
    async fn delete(&self, id: ConversationId) -> Result<(), StoreError>;

    /// Checks if a conversation has been saved.
    async fn exists(&self, id: ConversationId) -> Result<bool, StoreError>;
}
