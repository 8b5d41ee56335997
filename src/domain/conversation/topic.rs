//! Discussion topics and their per-conversation coverage.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::domain::foundation::Fraction;

/// How important it is that a topic gets discussed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopicPriority {
    /// Must be covered before the conversation can complete.
    Required,
    /// Should be covered if the user is willing.
    Important,
    /// Nice to have.
    Optional,
}

impl TopicPriority {
    /// Lowercase label used in prompts.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Important => "important",
            Self::Optional => "optional",
        }
    }
}

/// How deeply a topic should be explored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TargetDepth {
    /// A brief mention is enough.
    Surface,
    /// A few details are expected.
    #[default]
    Moderate,
    /// Probe for specifics and examples.
    Deep,
}

impl TargetDepth {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Surface => "surface",
            Self::Moderate => "moderate",
            Self::Deep => "deep",
        }
    }

    /// Guidance phrase used in prompts.
    pub fn guidance(&self) -> &'static str {
        match self {
            Self::Surface => "a brief answer is enough",
            Self::Moderate => "gather the key details",
            Self::Deep => "probe for specifics, examples and context",
        }
    }
}

/// Static definition of a discussion topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationTopic {
    pub id: String,
    pub name: String,
    pub description: String,
    pub priority: TopicPriority,
    #[serde(default)]
    pub depth: TargetDepth,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction_field: Option<String>,
}

/// Words too common to signal a topic on their own.
const STOP_WORDS: &[&str] = &[
    "about", "their", "there", "these", "those", "which", "would", "could", "should", "where",
    "being", "other", "after", "before", "while", "with", "from", "that", "this", "what", "when",
    "have", "into", "your", "they", "them",
];

/// Keywords shorter than this are ignored when split out of descriptions.
const MIN_KEYWORD_LEN: usize = 4;

impl ConversationTopic {
    /// Creates a topic with moderate target depth and no extraction link.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        priority: TopicPriority,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            priority,
            depth: TargetDepth::default(),
            extraction_field: None,
        }
    }

    /// Sets the target depth.
    pub fn with_depth(mut self, depth: TargetDepth) -> Self {
        self.depth = depth;
        self
    }

    /// Links the topic to an extraction schema field.
    pub fn with_extraction_field(mut self, field: impl Into<String>) -> Self {
        self.extraction_field = Some(field.into());
        self
    }

    /// Returns true if this topic gates completion.
    pub fn is_required(&self) -> bool {
        self.priority == TopicPriority::Required
    }

    /// Lowercase keyword set used by the keyword coverage heuristic.
    ///
    /// Built from the full topic name, the significant words of the name and
    /// description, and the linked extraction field name split on camelCase
    /// and snake_case boundaries.
    pub fn keywords(&self) -> BTreeSet<String> {
        let mut keywords = BTreeSet::new();

        let name = self.name.trim().to_lowercase();
        if !name.is_empty() {
            keywords.insert(name);
        }

        for word in significant_words(&self.name).chain(significant_words(&self.description)) {
            keywords.insert(word);
        }

        if let Some(field) = &self.extraction_field {
            for word in split_identifier(field) {
                if word.len() >= MIN_KEYWORD_LEN && !STOP_WORDS.contains(&word.as_str()) {
                    keywords.insert(word);
                }
            }
        }

        keywords
    }
}

fn significant_words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .map(str::to_lowercase)
        .filter(|w| w.chars().count() >= MIN_KEYWORD_LEN && !STOP_WORDS.contains(&w.as_str()))
}

/// Splits `issueCategory` / `issue_category` into `["issue", "category"]`.
fn split_identifier(identifier: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();

    for c in identifier.chars() {
        if c == '_' || c == '-' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
        } else if c.is_uppercase() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            current.extend(c.to_lowercase());
        } else {
            current.push(c);
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Mutable per-conversation record of how far a topic has been discussed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicCoverage {
    pub(crate) topic_id: String,
    pub(crate) name: String,
    pub(crate) covered: bool,
    pub(crate) depth: Fraction,
    pub(crate) priority: TopicPriority,
    pub(crate) turn_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) last_mentioned_turn: Option<u32>,
}

impl TopicCoverage {
    /// Creates an untouched coverage record for a configured topic.
    pub fn from_topic(topic: &ConversationTopic) -> Self {
        Self {
            topic_id: topic.id.clone(),
            name: topic.name.clone(),
            covered: false,
            depth: Fraction::ZERO,
            priority: topic.priority,
            turn_count: 0,
            last_mentioned_turn: None,
        }
    }

    /// Records a mention of this topic at the given conversation turn.
    ///
    /// Depth only ever deepens.
    pub(crate) fn record(&mut self, depth: Fraction, turn: u32) {
        self.covered = self.covered || depth.is_positive();
        self.depth = self.depth.max(depth);
        self.turn_count += 1;
        self.last_mentioned_turn = Some(turn);
    }

    pub fn topic_id(&self) -> &str {
        &self.topic_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_covered(&self) -> bool {
        self.covered
    }

    pub fn depth(&self) -> Fraction {
        self.depth
    }

    pub fn priority(&self) -> TopicPriority {
        self.priority
    }

    pub fn turn_count(&self) -> u32 {
        self.turn_count
    }

    pub fn last_mentioned_turn(&self) -> Option<u32> {
        self.last_mentioned_turn
    }
}
