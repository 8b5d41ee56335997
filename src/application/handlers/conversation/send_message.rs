//! SendMessage command handler.
//!
//! Runs one user turn: load, step the driver, save. Turns on the same
//! conversation are serialized; the state is saved only when the turn
//! succeeds, so a failed provider call can be retried with the same message.

use std::sync::Arc;

use super::errors::TurnError;
use crate::application::conversation_driver::{ConversationDriver, TurnOutcome};
use crate::application::conversation_locks::ConversationLocks;
use crate::domain::conversation::ConversationState;
use crate::domain::foundation::ConversationId;
use crate::ports::{ConversationStore, FormConfigSource};

/// Command to send a user message.
#[derive(Debug, Clone)]
pub struct SendMessageCommand {
    pub conversation_id: ConversationId,
    pub content: String,
}

impl SendMessageCommand {
    pub fn new(conversation_id: ConversationId, content: impl Into<String>) -> Self {
        Self {
            conversation_id,
            content: content.into(),
        }
    }
}

/// Result of a processed turn.
#[derive(Debug, Clone)]
pub struct SendMessageResult {
    pub state: ConversationState,
    pub outcome: TurnOutcome,
}

/// Handler for SendMessage commands.
pub struct SendMessageHandler {
    forms: Arc<dyn FormConfigSource>,
    store: Arc<dyn ConversationStore>,
    driver: ConversationDriver,
    locks: ConversationLocks,
}

impl SendMessageHandler {
    pub fn new(
        forms: Arc<dyn FormConfigSource>,
        store: Arc<dyn ConversationStore>,
        driver: ConversationDriver,
        locks: ConversationLocks,
    ) -> Self {
        Self {
            forms,
            store,
            driver,
            locks,
        }
    }

    pub async fn handle(&self, cmd: SendMessageCommand) -> Result<SendMessageResult, TurnError> {
        let content = cmd.content.trim();
        if content.is_empty() {
            return Err(TurnError::EmptyMessage);
        }

        let _guard = self.locks.acquire(cmd.conversation_id).await;

        let state = self
            .store
            .load(cmd.conversation_id)
            .await?
            .ok_or(TurnError::NotFound(cmd.conversation_id))?;

        let config = self
            .forms
            .resolve(state.form_id())
            .await?
            .ok_or(TurnError::FormNotFound(state.form_id()))?;

        let (next, outcome) = self.driver.step(&state, content, &config).await?;

        self.store.save(&next).await?;

        tracing::debug!(
            conversation_id = %cmd.conversation_id,
            turn = next.turn_count(),
            status = %next.status(),
            "turn processed"
        );

        Ok(SendMessageResult {
            state: next,
            outcome,
        })
    }
}
