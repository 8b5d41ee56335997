//! ConversationDriver - runs one turn of a conversation against the LLM.
//!
//! The driver never mutates the state it is given. It works on a copy and
//! hands the copy back only when the turn succeeds, so a provider failure
//! leaves the caller's state exactly as it was and the same turn can be
//! retried.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::conversation::{
    build_system_prompt, initial_system_message, is_empty_value, should_complete,
    validate_extractions, CompletionDecision, ConversationError, ConversationState,
    ConversationalFormConfig, FieldViolation, Message, MessageRole,
};
use crate::domain::foundation::Fraction;
use crate::ports::{ConversationalLlm, LlmReply, ProviderError};

/// Errors from a single driver step.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DriverError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Conversation(#[from] ConversationError),
}

/// What happened during a turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    /// Reply to show the user.
    pub assistant_text: String,
    /// Completion decision evaluated after the turn.
    pub decision: CompletionDecision,
    /// Required schema fields still without a value.
    pub missing_fields: Vec<String>,
    /// Topics whose coverage moved this turn.
    pub updated_topics: Vec<String>,
    /// Extracted values that failed schema validation. They are merged anyway.
    pub violations: Vec<FieldViolation>,
}

/// Drives conversations through the conversational LLM port.
#[derive(Clone)]
pub struct ConversationDriver {
    llm: Arc<dyn ConversationalLlm>,
    timeout: Duration,
}

impl ConversationDriver {
    pub fn new(llm: Arc<dyn ConversationalLlm>, timeout: Duration) -> Self {
        Self { llm, timeout }
    }

    /// Asks the model for its opening message on a freshly created conversation.
    ///
    /// The greeting is an assistant message and does not consume turn budget.
    /// Only this call carries the opening instruction.
    pub async fn open(
        &self,
        state: &ConversationState,
        config: &ConversationalFormConfig,
    ) -> Result<(ConversationState, String), DriverError> {
        let mut next = state.clone();
        let reply = self.call(&next, &initial_system_message(config)).await?;

        next.append_message(MessageRole::Assistant, reply.assistant_text.clone())?;
        Ok((next, reply.assistant_text))
    }

    /// Runs one user turn.
    ///
    /// 1. append the user message
    /// 2. ask the model for a reply
    /// 3. append the reply
    /// 4. move coverage from extractions, or from keywords when no field
    ///    carries a value
    /// 5. stop on a fatal provider issue, otherwise evaluate completion
    ///
    /// # Errors
    ///
    /// `DriverError::Provider` when the model call fails or times out;
    /// `DriverError::Conversation` when the conversation is no longer active.
    /// In both cases `state` is untouched.
    pub async fn step(
        &self,
        state: &ConversationState,
        user_message: &str,
        config: &ConversationalFormConfig,
    ) -> Result<(ConversationState, TurnOutcome), DriverError> {
        let mut next = state.clone();
        next.append_message(MessageRole::User, user_message)?;

        let reply = self.call(&next, &build_system_prompt(config)).await?;
        next.append_message(MessageRole::Assistant, reply.assistant_text.clone())?;

        let conversation_id = next.conversation_id();
        let mut violations = Vec::new();
        let updated_topics = match &reply.extractions {
            Some(extractions) if extractions.values().any(|v| !is_empty_value(v)) => {
                violations = validate_extractions(&config.extraction_schema, extractions);
                for violation in &violations {
                    tracing::warn!(
                        %conversation_id,
                        field = %violation.field,
                        reason = %violation.reason,
                        "extracted value failed schema validation"
                    );
                }

                let updated = next.update_from_extractions(extractions, &config.extraction_schema)?;
                let confidence = Fraction::new(reply.confidence.unwrap_or(0.0));
                next.merge_extractions(extractions, confidence)?;
                updated
            }
            extractions => {
                // A bare confidence may still arrive without field values
                if let Some(extractions) = extractions {
                    let confidence = Fraction::new(reply.confidence.unwrap_or(0.0));
                    next.merge_extractions(extractions, confidence)?;
                }
                next.analyze_and_update_from_keywords(user_message, &config.topics)?
            }
        };

        let decision = if let Some(issue) = &reply.fatal_issue {
            tracing::error!(%conversation_id, issue = %issue, "provider reported a fatal issue");
            next.mark_error(issue.clone())?;
            CompletionDecision::continue_conversation()
        } else {
            let decision = should_complete(&next, config);
            if let Some(reason) = decision.reason {
                next.complete(reason.as_str())?;
                tracing::info!(
                    %conversation_id,
                    turn = next.turn_count(),
                    reason = %reason,
                    degraded = reason.is_degraded(),
                    "conversation completed"
                );
            }
            decision
        };

        let missing_fields = next.missing_required_fields(&config.extraction_schema);
        Ok((
            next,
            TurnOutcome {
                assistant_text: reply.assistant_text,
                decision,
                missing_fields,
                updated_topics,
                violations,
            },
        ))
    }

    /// The stored system message is replaced by `system_prompt`; the
    /// provider only sees the user and assistant history.
    async fn call(
        &self,
        state: &ConversationState,
        system_prompt: &str,
    ) -> Result<LlmReply, ProviderError> {
        let conversation_id = state.conversation_id();
        let history: Vec<Message> = state
            .messages()
            .iter()
            .filter(|m| m.role != MessageRole::System)
            .cloned()
            .collect();

        let result = match tokio::time::timeout(
            self.timeout,
            self.llm.respond(system_prompt, &history),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(ProviderError::timeout(self.timeout.as_secs())),
        };

        if let Err(error) = &result {
            tracing::warn!(
                %conversation_id,
                turn = state.turn_count(),
                %error,
                retryable = error.is_retryable(),
                "conversational LLM call failed"
            );
        }
        result
    }
}
