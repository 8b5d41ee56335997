//! Topic coverage estimation.
//!
//! Two paths move topic coverage forward. Structured extractions are
//! preferred: each extracted value is mapped to its topic through the schema
//! and its shape gives a depth estimate. When the model returns no
//! extractions, a keyword heuristic scans the user's message instead. The
//! heuristic is approximate; it only ever raises depth, so it can never undo
//! extraction-based coverage.

use serde_json::Value;

use crate::domain::foundation::Fraction;

use super::errors::ConversationError;
use super::schema::{find_field, is_empty_value, ExtractionSchemaField, Extractions};
use super::state::ConversationState;
use super::topic::ConversationTopic;

/// Messages longer than this (in characters) count as elaborated.
const LONG_MESSAGE_CHARS: usize = 100;

/// Depth for a topic mentioned in a message, given how many of its keywords
/// matched.
pub fn estimate_keyword_depth(matched_keywords: usize, message_chars: usize) -> Fraction {
    let mut depth = 0.3 + 0.2 * matched_keywords as f64;
    if message_chars > LONG_MESSAGE_CHARS {
        depth += 0.3;
    }
    Fraction::new(depth.min(1.0))
}

/// Depth implied by the shape of an extracted value.
pub fn estimate_value_depth(value: &Value) -> Fraction {
    let depth = match value {
        Value::String(s) => match s.chars().count() {
            n if n > 100 => 1.0,
            n if n > 50 => 0.7,
            n if n > 20 => 0.5,
            _ => 0.3,
        },
        Value::Number(_) | Value::Bool(_) => 0.3,
        Value::Array(items) if !items.is_empty() => 0.6,
        Value::Object(_) => 0.7,
        Value::Array(_) | Value::Null => 0.0,
    };
    Fraction::new(depth)
}

impl ConversationState {
    /// Keyword fallback for turns without structured extractions.
    ///
    /// Returns the ids of the topics whose coverage was updated.
    pub fn analyze_and_update_from_keywords(
        &mut self,
        message: &str,
        topics: &[ConversationTopic],
    ) -> Result<Vec<String>, ConversationError> {
        let lowered = message.to_lowercase();
        let message_chars = message.chars().count();
        let mut updated = Vec::new();

        for topic in topics {
            let matched = topic
                .keywords()
                .iter()
                .filter(|keyword| lowered.contains(keyword.as_str()))
                .count();
            if matched == 0 {
                continue;
            }

            let depth = estimate_keyword_depth(matched, message_chars);
            if self.update_topic_coverage(&topic.id, depth)? {
                updated.push(topic.id.clone());
            }
        }

        Ok(updated)
    }

    /// Moves topic coverage from structured extractions.
    ///
    /// Fields without a schema entry or without a `topicId` are skipped here;
    /// they still reach the partial extractions through `merge_extractions`.
    pub fn update_from_extractions(
        &mut self,
        extractions: &Extractions,
        schema: &[ExtractionSchemaField],
    ) -> Result<Vec<String>, ConversationError> {
        let mut updated = Vec::new();

        for (name, value) in extractions {
            if is_empty_value(value) {
                continue;
            }
            let Some(topic_id) = find_field(schema, name).and_then(|f| f.topic_id.as_deref())
            else {
                continue;
            };

            if self.update_topic_coverage(topic_id, estimate_value_depth(value))? {
                updated.push(topic_id.to_string());
            }
        }

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::config::ConversationalFormConfig;
    use crate::domain::conversation::schema::FieldType;
    use crate::domain::conversation::topic::TopicPriority;
    use crate::domain::foundation::FormId;
    use serde_json::json;

    fn topics() -> Vec<ConversationTopic> {
        vec![
            ConversationTopic::new(
                "device",
                "Device",
                "Which laptop or printer is affected",
                TopicPriority::Required,
            ),
            ConversationTopic::new(
                "urgency",
                "Urgency",
                "How soon a fix is needed",
                TopicPriority::Important,
            ),
        ]
    }

    fn schema() -> Vec<ExtractionSchemaField> {
        vec![
            ExtractionSchemaField::new("deviceType", FieldType::String, true, "Device")
                .with_topic("device"),
            ExtractionSchemaField::new("notes", FieldType::String, false, "Free notes"),
        ]
    }

    fn state() -> ConversationState {
        let config = ConversationalFormConfig::new("Fix devices", topics()).with_schema(schema());
        ConversationState::create(FormId::new(), &config).unwrap()
    }

    fn extractions(value: Value) -> Extractions {
        value.as_object().cloned().unwrap()
    }

    mod keyword_depth {
        use super::*;

        #[test]
        fn single_match_in_short_message() {
            assert!((estimate_keyword_depth(1, 20).value() - 0.5).abs() < 1e-9);
        }

        #[test]
        fn long_message_adds_bonus() {
            assert!((estimate_keyword_depth(1, 101).value() - 0.8).abs() < 1e-9);
            assert!((estimate_keyword_depth(1, 100).value() - 0.5).abs() < 1e-9);
        }

        #[test]
        fn caps_at_one() {
            assert_eq!(estimate_keyword_depth(10, 500), Fraction::ONE);
        }
    }

    mod value_depth {
        use super::*;

        #[test]
        fn strings_scale_with_length() {
            assert_eq!(estimate_value_depth(&json!("a".repeat(101))), Fraction::new(1.0));
            assert_eq!(estimate_value_depth(&json!("a".repeat(51))), Fraction::new(0.7));
            assert_eq!(estimate_value_depth(&json!("a".repeat(21))), Fraction::new(0.5));
            assert_eq!(estimate_value_depth(&json!("hardware")), Fraction::new(0.3));
        }

        #[test]
        fn scalars_arrays_and_objects() {
            assert_eq!(estimate_value_depth(&json!(42)), Fraction::new(0.3));
            assert_eq!(estimate_value_depth(&json!(true)), Fraction::new(0.3));
            assert_eq!(estimate_value_depth(&json!(["a"])), Fraction::new(0.6));
            assert_eq!(estimate_value_depth(&json!({"k": 1})), Fraction::new(0.7));
        }
    }

    mod keywords {
        use super::*;

        #[test]
        fn matching_message_covers_topic() {
            let mut state = state();
            let updated = state
                .analyze_and_update_from_keywords("My LAPTOP will not boot", &topics())
                .unwrap();

            assert_eq!(updated, vec!["device"]);
            let device = state.topic("device").unwrap();
            assert!(device.is_covered());
            assert!((device.depth().value() - 0.5).abs() < 1e-9);
            assert!(!state.topic("urgency").unwrap().is_covered());
        }

        #[test]
        fn unrelated_message_changes_nothing() {
            let mut state = state();
            let updated = state
                .analyze_and_update_from_keywords("hello there", &topics())
                .unwrap();
            assert!(updated.is_empty());
            assert_eq!(state.coverage_summary().covered_topics, 0);
        }

        #[test]
        fn cannot_lower_extraction_based_depth() {
            let mut state = state();
            state
                .update_from_extractions(&extractions(json!({"deviceType": "a".repeat(120)})), &schema())
                .unwrap();
            state
                .analyze_and_update_from_keywords("laptop", &topics())
                .unwrap();
            assert_eq!(state.topic("device").unwrap().depth(), Fraction::ONE);
        }
    }

    mod extractions {
        use super::*;

        #[test]
        fn mapped_field_covers_its_topic() {
            let mut state = state();
            let updated = state
                .update_from_extractions(&extractions(json!({"deviceType": "laptop"})), &schema())
                .unwrap();

            assert_eq!(updated, vec!["device"]);
            assert_eq!(state.topic("device").unwrap().depth(), Fraction::new(0.3));
        }

        #[test]
        fn unmapped_and_empty_fields_are_skipped() {
            let mut state = state();
            let updated = state
                .update_from_extractions(
                    &extractions(json!({"notes": "call me later", "deviceType": "  ", "unknown": 1})),
                    &schema(),
                )
                .unwrap();

            assert!(updated.is_empty());
            assert_eq!(state.coverage_summary().covered_topics, 0);
            assert!(state.partial_extractions().is_empty());
        }
    }
}
