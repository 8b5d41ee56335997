//! In-Memory Conversation Store Adapter
//!
//! Keeps conversations in a process-local map. Useful for testing and
//! development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::conversation::ConversationState;
use crate::domain::foundation::ConversationId;
use crate::ports::{ConversationStore, StoreError};

/// In-memory storage for conversation state
#[derive(Debug, Clone, Default)]
pub struct InMemoryConversationStore {
    states: Arc<RwLock<HashMap<ConversationId, ConversationState>>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all stored conversations (useful for tests)
    pub async fn clear(&self) {
        self.states.write().await.clear();
    }

    /// Number of stored conversations
    pub async fn len(&self) -> usize {
        self.states.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.states.read().await.is_empty()
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn load(&self, id: ConversationId) -> Result<Option<ConversationState>, StoreError> {
        Ok(self.states.read().await.get(&id).cloned())
    }

    async fn save(&self, state: &ConversationState) -> Result<(), StoreError> {
        self.states
            .write()
            .await
            .insert(state.conversation_id(), state.clone());
        Ok(())
    }

    async fn delete(&self, id: ConversationId) -> Result<(), StoreError> {
        self.states.write().await.remove(&id);
        Ok(())
    }

    async fn exists(&self, id: ConversationId) -> Result<bool, StoreError> {
        Ok(self.states.read().await.contains_key(&id))
    }
}
