//! StartConversationHandler - Command handler for opening a conversation.

use std::sync::Arc;

use super::errors::StartConversationError;
use crate::application::conversation_driver::ConversationDriver;
use crate::domain::conversation::ConversationState;
use crate::domain::foundation::FormId;
use crate::ports::{ConversationStore, FormConfigSource};

/// Command to start a conversation for a form.
#[derive(Debug, Clone)]
pub struct StartConversationCommand {
    pub form_id: FormId,
}

/// Result of a started conversation.
#[derive(Debug, Clone)]
pub struct StartConversationResult {
    pub state: ConversationState,
    /// Opening message from the assistant.
    pub greeting: String,
}

/// Handler for starting conversations.
pub struct StartConversationHandler {
    forms: Arc<dyn FormConfigSource>,
    store: Arc<dyn ConversationStore>,
    driver: ConversationDriver,
}

impl StartConversationHandler {
    pub fn new(
        forms: Arc<dyn FormConfigSource>,
        store: Arc<dyn ConversationStore>,
        driver: ConversationDriver,
    ) -> Self {
        Self {
            forms,
            store,
            driver,
        }
    }

    /// Resolves and validates the form, creates the conversation, asks the
    /// model for a greeting and saves. Nothing is saved if any step fails.
    pub async fn handle(
        &self,
        cmd: StartConversationCommand,
    ) -> Result<StartConversationResult, StartConversationError> {
        // 1. Resolve form configuration
        let config = self
            .forms
            .resolve(cmd.form_id)
            .await?
            .ok_or(StartConversationError::FormNotFound(cmd.form_id))?;

        // 2. Create conversation (validates the config)
        let state = ConversationState::create(cmd.form_id, &config)?;

        // 3. Opening message
        let (state, greeting) = self.driver.open(&state, &config).await?;

        // 4. Persist
        self.store.save(&state).await?;

        tracing::info!(
            conversation_id = %state.conversation_id(),
            form_id = %cmd.form_id,
            topics = state.topics().len(),
            "conversation started"
        );

        Ok(StartConversationResult { state, greeting })
    }
}
