//! GetConversationHandler - Query handler for a conversation's progress.

use std::sync::Arc;

use serde::Serialize;

use super::errors::TurnError;
use crate::domain::conversation::{should_complete, CompletionDecision, ConversationState, CoverageSummary};
use crate::domain::foundation::ConversationId;
use crate::ports::{ConversationStore, FormConfigSource};

/// Query to get a conversation.
#[derive(Debug, Clone)]
pub struct GetConversationQuery {
    pub conversation_id: ConversationId,
}

/// Conversation plus progress derived from its form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationView {
    pub state: ConversationState,
    pub coverage: CoverageSummary,
    pub missing_fields: Vec<String>,
    /// Completion predicate at query time. Only meaningful while active.
    pub completion: CompletionDecision,
}

/// Handler for getting conversations.
pub struct GetConversationHandler {
    forms: Arc<dyn FormConfigSource>,
    store: Arc<dyn ConversationStore>,
}

impl GetConversationHandler {
    pub fn new(forms: Arc<dyn FormConfigSource>, store: Arc<dyn ConversationStore>) -> Self {
        Self { forms, store }
    }

    pub async fn handle(&self, query: GetConversationQuery) -> Result<ConversationView, TurnError> {
        let state = self
            .store
            .load(query.conversation_id)
            .await?
            .ok_or(TurnError::NotFound(query.conversation_id))?;

        let config = self
            .forms
            .resolve(state.form_id())
            .await?
            .ok_or(TurnError::FormNotFound(state.form_id()))?;

        Ok(ConversationView {
            coverage: state.coverage_summary(),
            missing_fields: state.missing_required_fields(&config.extraction_schema),
            completion: should_complete(&state, &config),
            state,
        })
    }
}
