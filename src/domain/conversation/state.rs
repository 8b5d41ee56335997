//! ConversationState - the aggregate root of a conversational form dialogue.
//!
//! Owns the transcript, per-topic coverage, the partial extraction
//! accumulator, the confidence ratchet and the lifecycle status. Every
//! mutation goes through a method that first checks the conversation is
//! still active; once terminal, only `touch` may change the record.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ConversationId, FormId, Fraction, StateMachine, Timestamp};

use super::config::ConversationalFormConfig;
use super::errors::{ConfigurationError, ConversationError};
use super::message::{Message, MessageRole};
use super::prompt::initial_system_message;
use super::schema::{self, ExtractionSchemaField, Extractions};
use super::status::ConversationStatus;
use super::topic::{TopicCoverage, TopicPriority};

/// Read-only aggregation of topic coverage for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageSummary {
    pub total_topics: usize,
    pub covered_topics: usize,
    pub required_topics: usize,
    pub covered_required_topics: usize,
    /// Mean depth over all topics, zero when there are none.
    pub average_depth: f64,
}

/// One conversation between a user and the form assistant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationState {
    conversation_id: ConversationId,
    form_id: FormId,
    messages: Vec<Message>,
    topics: Vec<TopicCoverage>,
    #[serde(default)]
    partial_extractions: Extractions,
    confidence: Fraction,
    turn_count: u32,
    max_turns: u32,
    status: ConversationStatus,
    started_at: Timestamp,
    updated_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    completed_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    completion_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ConversationState {
    /// Starts a new conversation for a validated form configuration.
    ///
    /// One coverage record is created per configured topic, in config order,
    /// and the transcript is seeded with the rendered system prompt.
    ///
    /// # Errors
    ///
    /// Returns the configuration's validation error; nothing is created.
    pub fn create(
        form_id: FormId,
        config: &ConversationalFormConfig,
    ) -> Result<Self, ConfigurationError> {
        config.validate()?;

        let conversation_id = ConversationId::new();
        for warning in config.warnings() {
            tracing::warn!(%conversation_id, %form_id, %warning, "form configuration warning");
        }

        let now = Timestamp::now();
        Ok(Self {
            conversation_id,
            form_id,
            messages: vec![Message::system(initial_system_message(config))],
            topics: config.topics.iter().map(TopicCoverage::from_topic).collect(),
            partial_extractions: Extractions::new(),
            confidence: Fraction::ZERO,
            turn_count: 0,
            max_turns: config.conversation_limits.max_turns,
            status: ConversationStatus::Active,
            started_at: now,
            updated_at: now,
            completed_at: None,
            completion_reason: None,
            error: None,
        })
    }

    // === Accessors ===

    pub fn conversation_id(&self) -> ConversationId {
        self.conversation_id
    }

    pub fn form_id(&self) -> FormId {
        self.form_id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn topics(&self) -> &[TopicCoverage] {
        &self.topics
    }

    pub fn topic(&self, topic_id: &str) -> Option<&TopicCoverage> {
        self.topics.iter().find(|t| t.topic_id == topic_id)
    }

    pub fn partial_extractions(&self) -> &Extractions {
        &self.partial_extractions
    }

    pub fn confidence(&self) -> Fraction {
        self.confidence
    }

    pub fn turn_count(&self) -> u32 {
        self.turn_count
    }

    pub fn max_turns(&self) -> u32 {
        self.max_turns
    }

    pub fn status(&self) -> ConversationStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    pub fn started_at(&self) -> Timestamp {
        self.started_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    pub fn completed_at(&self) -> Option<Timestamp> {
        self.completed_at
    }

    pub fn completion_reason(&self) -> Option<&str> {
        self.completion_reason.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn last_assistant_message(&self) -> Option<&Message> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::Assistant)
    }

    /// Returns true when every required-priority topic is covered.
    ///
    /// Vacuously true for a form without required topics.
    pub fn required_topics_covered(&self) -> bool {
        self.topics
            .iter()
            .filter(|t| t.priority == TopicPriority::Required)
            .all(TopicCoverage::is_covered)
    }

    // === Mutations ===

    /// Appends a message to the transcript.
    ///
    /// Only user messages consume turn budget.
    pub fn append_message(
        &mut self,
        role: MessageRole,
        content: impl Into<String>,
    ) -> Result<(), ConversationError> {
        self.ensure_active()?;

        self.messages.push(Message::new(role, content));
        if role == MessageRole::User {
            self.turn_count += 1;
        }
        self.touch();
        Ok(())
    }

    /// Records that a topic was discussed at the current turn.
    ///
    /// Depth only ever deepens. Unknown topic ids are logged and ignored;
    /// the return value says whether a topic was updated.
    pub fn update_topic_coverage(
        &mut self,
        topic_id: &str,
        depth: Fraction,
    ) -> Result<bool, ConversationError> {
        self.ensure_active()?;

        let conversation_id = self.conversation_id;
        let turn = self.turn_count;
        let Some(coverage) = self.topics.iter_mut().find(|t| t.topic_id == topic_id) else {
            tracing::warn!(
                %conversation_id,
                topic_id,
                "ignoring coverage update for unknown topic"
            );
            return Ok(false);
        };

        coverage.record(depth, turn);
        tracing::debug!(
            %conversation_id,
            topic_id,
            turn,
            depth = coverage.depth.value(),
            "topic coverage updated"
        );
        self.touch();
        Ok(true)
    }

    /// Shallow last-write-wins merge into the partial extractions.
    ///
    /// Confidence is raised to the new value if higher and never lowered.
    pub fn merge_extractions(
        &mut self,
        extractions: &Extractions,
        confidence: Fraction,
    ) -> Result<(), ConversationError> {
        self.ensure_active()?;

        for (field, value) in extractions {
            self.partial_extractions.insert(field.clone(), value.clone());
        }
        self.confidence = self.confidence.max(confidence);
        self.touch();
        Ok(())
    }

    /// Finishes the conversation.
    pub fn complete(&mut self, reason: impl Into<String>) -> Result<(), ConversationError> {
        self.transition(ConversationStatus::Completed)?;
        self.completion_reason = Some(reason.into());
        self.completed_at = Some(self.updated_at);
        Ok(())
    }

    /// Cancels the conversation.
    pub fn abandon(&mut self) -> Result<(), ConversationError> {
        self.transition(ConversationStatus::Abandoned)?;
        self.completed_at = Some(self.updated_at);
        Ok(())
    }

    /// Stops the conversation after an unrecoverable issue.
    pub fn mark_error(&mut self, message: impl Into<String>) -> Result<(), ConversationError> {
        self.transition(ConversationStatus::Error)?;
        self.error = Some(message.into());
        self.completed_at = Some(self.updated_at);
        Ok(())
    }

    /// Bumps `updated_at`. Allowed in every status.
    pub fn touch(&mut self) {
        self.updated_at = Timestamp::now();
    }

    // === Reporting ===

    pub fn coverage_summary(&self) -> CoverageSummary {
        let total_topics = self.topics.len();
        let covered_topics = self.topics.iter().filter(|t| t.covered).count();
        let required = || {
            self.topics
                .iter()
                .filter(|t| t.priority == TopicPriority::Required)
        };
        let average_depth = if total_topics == 0 {
            0.0
        } else {
            self.topics.iter().map(|t| t.depth.value()).sum::<f64>() / total_topics as f64
        };

        CoverageSummary {
            total_topics,
            covered_topics,
            required_topics: required().count(),
            covered_required_topics: required().filter(|t| t.covered).count(),
            average_depth,
        }
    }

    /// Required schema fields with no usable value collected so far.
    pub fn missing_required_fields(&self, schema: &[ExtractionSchemaField]) -> Vec<String> {
        schema::missing_required_fields(schema, &self.partial_extractions)
    }

    fn ensure_active(&self) -> Result<(), ConversationError> {
        if self.status.is_active() {
            Ok(())
        } else {
            Err(ConversationError::TerminalState {
                status: self.status,
            })
        }
    }

    fn transition(&mut self, target: ConversationStatus) -> Result<(), ConversationError> {
        self.status = self
            .status
            .transition_to(target)
            .map_err(|_| ConversationError::TerminalState {
                status: self.status,
            })?;
        self.touch();
        Ok(())
    }
}
