//! Built-in form templates.
//!
//! `TemplateCatalog` is an ordinary value: callers build one and pass it to
//! whatever needs it, so tests can assemble their own catalog.

use std::collections::BTreeMap;

use super::config::{ConversationLimits, ConversationalFormConfig, Persona, PersonaStyle};
use super::schema::{ExtractionSchemaField, FieldType, FieldValidation};
use super::topic::{ConversationTopic, TargetDepth, TopicPriority};

pub const IT_HELPDESK: &str = "it-helpdesk";
pub const CUSTOMER_FEEDBACK: &str = "customer-feedback";

/// IT support intake: what broke, how badly, and how to reach the reporter.
pub fn it_helpdesk_template() -> ConversationalFormConfig {
    let topics = vec![
        ConversationTopic::new(
            "t1",
            "Issue Category",
            "Whether the problem is hardware, software, network or account access",
            TopicPriority::Required,
        )
        .with_depth(TargetDepth::Surface)
        .with_extraction_field("issueCategory"),
        ConversationTopic::new(
            "t2",
            "Problem Description",
            "What is happening, error messages, and when it started",
            TopicPriority::Required,
        )
        .with_depth(TargetDepth::Deep)
        .with_extraction_field("description"),
        ConversationTopic::new(
            "t3",
            "Urgency",
            "How badly work is blocked and how many people are affected",
            TopicPriority::Required,
        )
        .with_extraction_field("urgency"),
        ConversationTopic::new(
            "t4",
            "Troubleshooting Steps",
            "Restarts, reinstalls or other fixes already attempted",
            TopicPriority::Important,
        )
        .with_extraction_field("stepsTried"),
        ConversationTopic::new(
            "t5",
            "Contact Preference",
            "Preferred email or phone for follow up",
            TopicPriority::Optional,
        )
        .with_depth(TargetDepth::Surface)
        .with_extraction_field("contactMethod"),
    ];

    let schema = vec![
        ExtractionSchemaField::new(
            "issueCategory",
            FieldType::Enum,
            true,
            "Broad category of the problem",
        )
        .with_options(["hardware", "software", "network", "access", "other"])
        .with_topic("t1"),
        ExtractionSchemaField::new(
            "description",
            FieldType::String,
            true,
            "Summary of the problem in the user's words",
        )
        .with_validation(FieldValidation {
            min_length: Some(10),
            max_length: Some(2000),
            ..Default::default()
        })
        .with_topic("t2"),
        ExtractionSchemaField::new("urgency", FieldType::Enum, true, "How urgent the fix is")
            .with_options(["low", "medium", "high", "critical"])
            .with_topic("t3"),
        ExtractionSchemaField::new(
            "affectedUsers",
            FieldType::Number,
            false,
            "Number of people affected",
        )
        .with_validation(FieldValidation {
            min: Some(1.0),
            ..Default::default()
        })
        .with_topic("t3"),
        ExtractionSchemaField::new(
            "stepsTried",
            FieldType::Array,
            false,
            "Troubleshooting steps already attempted",
        )
        .with_topic("t4"),
        ExtractionSchemaField::new(
            "contactMethod",
            FieldType::String,
            false,
            "Email address or phone number for follow up",
        )
        .with_topic("t5"),
    ];

    ConversationalFormConfig::new(
        "Collect enough detail about an IT problem to open a support ticket",
        topics,
    )
    .with_context("Internal IT helpdesk. Users are employees reporting workplace technology problems.")
    .with_persona(
        Persona::new(PersonaStyle::Professional)
            .with_behavior("Acknowledge the inconvenience before asking follow up questions")
            .with_restriction("Promise a resolution time")
            .with_restriction("Ask for passwords"),
    )
    .with_schema(schema)
    .with_limits(ConversationLimits::new(15, 20, 0.7))
}

/// Post-purchase feedback with a rating and free text.
pub fn customer_feedback_template() -> ConversationalFormConfig {
    let topics = vec![
        ConversationTopic::new(
            "experience",
            "Overall Experience",
            "How the customer felt about the product or service",
            TopicPriority::Required,
        )
        .with_extraction_field("rating"),
        ConversationTopic::new(
            "highlights",
            "Highlights",
            "What worked well",
            TopicPriority::Important,
        )
        .with_depth(TargetDepth::Deep)
        .with_extraction_field("positives"),
        ConversationTopic::new(
            "improvements",
            "Improvements",
            "What should change or was disappointing",
            TopicPriority::Important,
        )
        .with_depth(TargetDepth::Deep)
        .with_extraction_field("improvements"),
        ConversationTopic::new(
            "recommend",
            "Recommendation",
            "Whether they would recommend us to a friend",
            TopicPriority::Optional,
        )
        .with_depth(TargetDepth::Surface)
        .with_extraction_field("wouldRecommend"),
    ];

    let schema = vec![
        ExtractionSchemaField::new("rating", FieldType::Number, true, "Satisfaction from 1 to 5")
            .with_validation(FieldValidation {
                min: Some(1.0),
                max: Some(5.0),
                ..Default::default()
            })
            .with_topic("experience"),
        ExtractionSchemaField::new("positives", FieldType::String, false, "What went well")
            .with_topic("highlights"),
        ExtractionSchemaField::new(
            "improvements",
            FieldType::String,
            false,
            "What could be better",
        )
        .with_topic("improvements"),
        ExtractionSchemaField::new(
            "wouldRecommend",
            FieldType::Boolean,
            false,
            "Would recommend to others",
        )
        .with_topic("recommend"),
    ];

    ConversationalFormConfig::new("Gather honest feedback about a recent purchase", topics)
        .with_persona(Persona::new(PersonaStyle::Friendly))
        .with_schema(schema)
        .with_limits(ConversationLimits::new(10, 15, 0.6))
}

/// Named collection of form templates.
#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    templates: BTreeMap<String, ConversationalFormConfig>,
}

impl TemplateCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog holding every built-in template.
    pub fn builtin() -> Self {
        Self::new()
            .with(IT_HELPDESK, it_helpdesk_template())
            .with(CUSTOMER_FEEDBACK, customer_feedback_template())
    }

    pub fn with(mut self, key: impl Into<String>, config: ConversationalFormConfig) -> Self {
        self.templates.insert(key.into(), config);
        self
    }

    pub fn get(&self, key: &str) -> Option<&ConversationalFormConfig> {
        self.templates.get(key)
    }

    /// Template keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
