//! Completion predicate.
//!
//! Decides whether a conversation should finish. Budgets are checked before
//! coverage, so a conversation can finish with required topics still open;
//! such completions are reported as degraded.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::Timestamp;

use super::config::ConversationalFormConfig;
use super::state::ConversationState;

/// Why a conversation finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionReason {
    MaxTurnsReached,
    MaxDurationReached,
    RequirementsMet,
}

impl CompletionReason {
    /// Budget-driven completions may be missing required data.
    pub fn is_degraded(&self) -> bool {
        !matches!(self, Self::RequirementsMet)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MaxTurnsReached => "Maximum turns reached",
            Self::MaxDurationReached => "Maximum duration reached",
            Self::RequirementsMet => "All required topics covered with sufficient confidence",
        }
    }
}

impl fmt::Display for CompletionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of the completion predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionDecision {
    pub should_complete: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<CompletionReason>,
}

impl CompletionDecision {
    pub fn complete(reason: CompletionReason) -> Self {
        Self {
            should_complete: true,
            reason: Some(reason),
        }
    }

    pub fn continue_conversation() -> Self {
        Self {
            should_complete: false,
            reason: None,
        }
    }
}

/// Evaluates completion against the current clock.
pub fn should_complete(
    state: &ConversationState,
    config: &ConversationalFormConfig,
) -> CompletionDecision {
    should_complete_at(state, config, Timestamp::now())
}

/// Evaluates completion at an explicit instant. First match wins:
///
/// 1. turn ceiling reached
/// 2. duration ceiling reached
/// 3. a required topic is uncovered: continue
/// 4. confidence below threshold: continue
/// 5. otherwise complete
pub fn should_complete_at(
    state: &ConversationState,
    config: &ConversationalFormConfig,
    now: Timestamp,
) -> CompletionDecision {
    let limits = &config.conversation_limits;

    if state.turn_count() >= limits.max_turns {
        return CompletionDecision::complete(CompletionReason::MaxTurnsReached);
    }

    let elapsed = now.duration_since(&state.started_at());
    if elapsed >= chrono::Duration::minutes(i64::from(limits.max_duration)) {
        return CompletionDecision::complete(CompletionReason::MaxDurationReached);
    }

    if !state.required_topics_covered() {
        return CompletionDecision::continue_conversation();
    }

    if state.confidence() < limits.min_confidence {
        return CompletionDecision::continue_conversation();
    }

    CompletionDecision::complete(CompletionReason::RequirementsMet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::config::ConversationLimits;
    use crate::domain::conversation::message::MessageRole;
    use crate::domain::conversation::schema::{ExtractionSchemaField, Extractions, FieldType};
    use crate::domain::conversation::topic::{ConversationTopic, TopicPriority};
    use crate::domain::foundation::{FormId, Fraction};
    use serde_json::json;

    fn config() -> ConversationalFormConfig {
        ConversationalFormConfig::new(
            "Triage",
            vec![ConversationTopic::new("t1", "Issue", "What happened", TopicPriority::Required)],
        )
        .with_schema(vec![ExtractionSchemaField::new(
            "issueCategory",
            FieldType::String,
            true,
            "Category",
        )
        .with_topic("t1")])
        .with_limits(ConversationLimits::new(5, 30, 0.5))
    }

    fn started() -> ConversationState {
        ConversationState::create(FormId::new(), &config()).unwrap()
    }

    fn hardware() -> Extractions {
        json!({"issueCategory": "hardware"}).as_object().cloned().unwrap()
    }

    #[test]
    fn fresh_conversation_continues() {
        let state = started();
        assert_eq!(state.turn_count(), 0);
        assert_eq!(
            should_complete(&state, &config()),
            CompletionDecision::continue_conversation()
        );
    }

    #[test]
    fn covered_and_confident_completes() {
        let mut state = started();
        state.update_from_extractions(&hardware(), &config().extraction_schema).unwrap();
        let t1 = state.topic("t1").unwrap();
        assert!(t1.is_covered());
        assert_eq!(t1.depth(), Fraction::new(0.3));

        state.merge_extractions(&hardware(), Fraction::new(0.6)).unwrap();

        let decision = should_complete(&state, &config());
        assert_eq!(decision, CompletionDecision::complete(CompletionReason::RequirementsMet));
        assert_eq!(
            decision.reason.unwrap().to_string(),
            "All required topics covered with sufficient confidence"
        );
    }

    #[test]
    fn covered_but_unconfident_continues() {
        let mut state = started();
        state.update_from_extractions(&hardware(), &config().extraction_schema).unwrap();
        state.merge_extractions(&hardware(), Fraction::new(0.2)).unwrap();

        assert!(!should_complete(&state, &config()).should_complete);
    }

    #[test]
    fn turn_ceiling_overrides_coverage() {
        let mut state = started();
        for _ in 0..5 {
            state.append_message(MessageRole::User, "still thinking").unwrap();
        }
        assert!(!state.topic("t1").unwrap().is_covered());

        let decision = should_complete(&state, &config());
        assert_eq!(decision, CompletionDecision::complete(CompletionReason::MaxTurnsReached));
        assert_eq!(decision.reason.unwrap().to_string(), "Maximum turns reached");
        assert!(decision.reason.unwrap().is_degraded());
    }

    #[test]
    fn duration_ceiling_ends_conversation() {
        let state = started();
        let later = state.started_at().plus_minutes(30);

        assert_eq!(
            should_complete_at(&state, &config(), later),
            CompletionDecision::complete(CompletionReason::MaxDurationReached)
        );
        assert!(!should_complete_at(&state, &config(), state.started_at().plus_minutes(29)).should_complete);
    }

    #[test]
    fn turn_ceiling_is_checked_before_duration() {
        let mut state = started();
        for _ in 0..5 {
            state.append_message(MessageRole::User, "x").unwrap();
        }
        let later = state.started_at().plus_minutes(60);
        assert_eq!(
            should_complete_at(&state, &config(), later).reason,
            Some(CompletionReason::MaxTurnsReached)
        );
    }

    #[test]
    fn requirements_met_is_not_degraded() {
        assert!(!CompletionReason::RequirementsMet.is_degraded());
        assert!(CompletionReason::MaxDurationReached.is_degraded());
    }
}
