//! AbandonConversationHandler - Command handler for ending a conversation early.

use std::sync::Arc;

use super::errors::TurnError;
use crate::application::conversation_locks::ConversationLocks;
use crate::domain::conversation::ConversationState;
use crate::domain::foundation::ConversationId;
use crate::ports::ConversationStore;

/// Command to abandon a conversation.
#[derive(Debug, Clone)]
pub struct AbandonConversationCommand {
    pub conversation_id: ConversationId,
}

/// Handler for abandoning conversations.
pub struct AbandonConversationHandler {
    store: Arc<dyn ConversationStore>,
    locks: ConversationLocks,
}

impl AbandonConversationHandler {
    pub fn new(store: Arc<dyn ConversationStore>, locks: ConversationLocks) -> Self {
        Self { store, locks }
    }

    pub async fn handle(
        &self,
        cmd: AbandonConversationCommand,
    ) -> Result<ConversationState, TurnError> {
        let _guard = self.locks.acquire(cmd.conversation_id).await;

        let mut state = self
            .store
            .load(cmd.conversation_id)
            .await?
            .ok_or(TurnError::NotFound(cmd.conversation_id))?;

        state.abandon()?;
        self.store.save(&state).await?;

        tracing::info!(
            conversation_id = %cmd.conversation_id,
            turn = state.turn_count(),
            "conversation abandoned"
        );
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemoryConversationStore;
    use crate::domain::conversation::{it_helpdesk_template, ConversationError, ConversationStatus};
    use crate::domain::foundation::FormId;

    async fn saved_conversation(store: &InMemoryConversationStore) -> ConversationId {
        let state = ConversationState::create(FormId::new(), &it_helpdesk_template()).unwrap();
        store.save(&state).await.unwrap();
        state.conversation_id()
    }

    #[tokio::test]
    async fn abandons_active_conversation() {
        let store = Arc::new(InMemoryConversationStore::new());
        let id = saved_conversation(&store).await;
        let handler = AbandonConversationHandler::new(store.clone(), ConversationLocks::new());

        let state = handler
            .handle(AbandonConversationCommand { conversation_id: id })
            .await
            .unwrap();

        assert_eq!(state.status(), ConversationStatus::Abandoned);
        assert!(state.completed_at().is_some());
        let saved = store.load(id).await.unwrap().unwrap();
        assert_eq!(saved.status(), ConversationStatus::Abandoned);
    }

    #[tokio::test]
    async fn abandoning_twice_fails() {
        let store = Arc::new(InMemoryConversationStore::new());
        let id = saved_conversation(&store).await;
        let handler = AbandonConversationHandler::new(store, ConversationLocks::new());
        let cmd = AbandonConversationCommand { conversation_id: id };

        handler.handle(cmd.clone()).await.unwrap();
        let err = handler.handle(cmd).await.unwrap_err();

        assert!(matches!(
            err,
            TurnError::Conversation(ConversationError::TerminalState {
                status: ConversationStatus::Abandoned
            })
        ));
    }

    #[tokio::test]
    async fn missing_conversation_is_not_found() {
        let handler = AbandonConversationHandler::new(
            Arc::new(InMemoryConversationStore::new()),
            ConversationLocks::new(),
        );
        let err = handler
            .handle(AbandonConversationCommand {
                conversation_id: ConversationId::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, TurnError::NotFound(_)));
    }
}
