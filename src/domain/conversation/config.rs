//! Conversational form configuration.
//!
//! Immutable for the lifetime of a conversation. Loaded from form templates
//! and validated before any conversation is allowed to start.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::domain::foundation::Fraction;

use super::errors::{ConfigWarning, ConfigurationError};
use super::schema::{ExtractionSchemaField, FieldType};
use super::topic::{ConversationTopic, TopicPriority};

/// Tone preset for the assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PersonaStyle {
    #[default]
    Professional,
    Friendly,
    Casual,
    Formal,
    /// Uses `Persona::custom_prompt` verbatim.
    Custom,
}

/// How the assistant should sound and behave.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    #[serde(default)]
    pub style: PersonaStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub behaviors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub restrictions: Vec<String>,
}

impl Persona {
    pub fn new(style: PersonaStyle) -> Self {
        Self {
            style,
            ..Default::default()
        }
    }

    /// Custom persona speaking with the given prompt.
    pub fn custom(prompt: impl Into<String>) -> Self {
        Self {
            style: PersonaStyle::Custom,
            custom_prompt: Some(prompt.into()),
            ..Default::default()
        }
    }

    pub fn with_behavior(mut self, behavior: impl Into<String>) -> Self {
        self.behaviors.push(behavior.into());
        self
    }

    pub fn with_restriction(mut self, restriction: impl Into<String>) -> Self {
        self.restrictions.push(restriction.into());
        self
    }
}

/// Budgets bounding a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationLimits {
    /// Ceiling on user turns.
    pub max_turns: u32,
    /// Ceiling on wall-clock duration, in minutes.
    pub max_duration: u32,
    /// Confidence required before a fully covered conversation completes.
    pub min_confidence: Fraction,
}

impl ConversationLimits {
    pub fn new(max_turns: u32, max_duration: u32, min_confidence: f64) -> Self {
        Self {
            max_turns,
            max_duration,
            min_confidence: Fraction::new(min_confidence),
        }
    }
}

impl Default for ConversationLimits {
    fn default() -> Self {
        Self::new(20, 30, 0.7)
    }
}

/// Everything needed to run one kind of conversational form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationalFormConfig {
    pub objective: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    pub topics: Vec<ConversationTopic>,
    #[serde(default)]
    pub persona: Persona,
    #[serde(default)]
    pub extraction_schema: Vec<ExtractionSchemaField>,
    #[serde(default)]
    pub conversation_limits: ConversationLimits,
}

impl ConversationalFormConfig {
    /// Creates a config with default persona and limits.
    pub fn new(objective: impl Into<String>, topics: Vec<ConversationTopic>) -> Self {
        Self {
            objective: objective.into(),
            context: None,
            topics,
            persona: Persona::default(),
            extraction_schema: Vec::new(),
            conversation_limits: ConversationLimits::default(),
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_persona(mut self, persona: Persona) -> Self {
        self.persona = persona;
        self
    }

    pub fn with_schema(mut self, schema: Vec<ExtractionSchemaField>) -> Self {
        self.extraction_schema = schema;
        self
    }

    pub fn with_limits(mut self, limits: ConversationLimits) -> Self {
        self.conversation_limits = limits;
        self
    }

    /// Looks up a topic by id.
    pub fn topic(&self, topic_id: &str) -> Option<&ConversationTopic> {
        self.topics.iter().find(|t| t.id == topic_id)
    }

    /// Topics that gate completion.
    pub fn required_topics(&self) -> impl Iterator<Item = &ConversationTopic> {
        self.topics.iter().filter(|t| t.is_required())
    }

    /// Checks referential integrity and basic sanity.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigurationError` found; a conversation must not
    /// be started from a config that fails here.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.objective.trim().is_empty() {
            return Err(ConfigurationError::EmptyObjective);
        }

        let mut topic_ids = HashSet::new();
        for topic in &self.topics {
            if !topic_ids.insert(topic.id.as_str()) {
                return Err(ConfigurationError::DuplicateTopicId(topic.id.clone()));
            }
        }

        let mut fields = HashSet::new();
        for field in &self.extraction_schema {
            if !fields.insert(field.field.as_str()) {
                return Err(ConfigurationError::DuplicateField(field.field.clone()));
            }

            if let Some(topic_id) = &field.topic_id {
                if !topic_ids.contains(topic_id.as_str()) {
                    return Err(ConfigurationError::UnknownTopic {
                        field: field.field.clone(),
                        topic_id: topic_id.clone(),
                    });
                }
            }

            if field.field_type == FieldType::Enum
                && field.options.as_ref().map_or(true, Vec::is_empty)
            {
                return Err(ConfigurationError::EmptyEnumOptions {
                    field: field.field.clone(),
                });
            }

            if let Some(pattern) = field.validation.as_ref().and_then(|v| v.pattern.as_deref()) {
                Regex::new(pattern).map_err(|e| ConfigurationError::InvalidPattern {
                    field: field.field.clone(),
                    reason: e.to_string(),
                })?;
            }
        }

        if self.persona.style == PersonaStyle::Custom
            && self
                .persona
                .custom_prompt
                .as_deref()
                .map_or(true, |p| p.trim().is_empty())
        {
            return Err(ConfigurationError::MissingCustomPrompt);
        }

        let limits = &self.conversation_limits;
        if limits.max_turns == 0 {
            return Err(ConfigurationError::InvalidLimits(
                "maxTurns must be at least 1".to_string(),
            ));
        }
        if limits.max_duration == 0 {
            return Err(ConfigurationError::InvalidLimits(
                "maxDuration must be at least 1 minute".to_string(),
            ));
        }

        Ok(())
    }

    /// Non-fatal design warnings.
    pub fn warnings(&self) -> Vec<ConfigWarning> {
        self.extraction_schema
            .iter()
            .filter(|field| field.required)
            .filter(|field| !self.is_reachable_from_required_topic(field))
            .map(|field| ConfigWarning::RequiredFieldUnreachable {
                field: field.field.clone(),
            })
            .collect()
    }

    fn is_reachable_from_required_topic(&self, field: &ExtractionSchemaField) -> bool {
        let linked_by_field = field
            .topic_id
            .as_deref()
            .and_then(|id| self.topic(id))
            .is_some_and(|t| t.priority == TopicPriority::Required);

        let linked_by_topic = self
            .required_topics()
            .any(|t| t.extraction_field.as_deref() == Some(field.field.as_str()));

        linked_by_field || linked_by_topic
    }
}
