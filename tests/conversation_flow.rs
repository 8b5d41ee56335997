//! End-to-end conversation flows through the command handlers.
//!
//! Uses the scripted `MockLlm` with the in-memory and file adapters, so no
//! external service is involved.

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use conversational_forms::adapters::{
    FileConversationStore, InMemoryConversationStore, InMemoryFormConfigSource, MockLlm,
};
use conversational_forms::application::{
    AbandonConversationCommand, AbandonConversationHandler, ConversationDriver, ConversationLocks,
    GetConversationHandler, GetConversationQuery, SendMessageCommand, SendMessageHandler,
    StartConversationCommand, StartConversationHandler, TurnError,
};
use conversational_forms::domain::conversation::{
    it_helpdesk_template, CompletionReason, ConversationLimits, ConversationStatus, Extractions,
    TemplateCatalog, IT_HELPDESK,
};
use conversational_forms::domain::foundation::{ErrorCode, FormId, Fraction};
use conversational_forms::ports::{ConversationStore, LlmReply};

// =============================================================================
// Test Infrastructure
// =============================================================================

struct Harness {
    start: StartConversationHandler,
    send: SendMessageHandler,
    abandon: AbandonConversationHandler,
    get: GetConversationHandler,
}

impl Harness {
    fn new(
        forms: Arc<InMemoryFormConfigSource>,
        store: Arc<dyn ConversationStore>,
        llm: MockLlm,
    ) -> Self {
        let driver = ConversationDriver::new(Arc::new(llm), Duration::from_secs(5));
        let locks = ConversationLocks::new();
        Self {
            start: StartConversationHandler::new(forms.clone(), store.clone(), driver.clone()),
            send: SendMessageHandler::new(forms.clone(), store.clone(), driver, locks.clone()),
            abandon: AbandonConversationHandler::new(store.clone(), locks),
            get: GetConversationHandler::new(forms, store),
        }
    }
}

fn extracted(value: serde_json::Value) -> Extractions {
    value.as_object().cloned().unwrap_or_default()
}

async fn helpdesk_form(limits: Option<ConversationLimits>) -> (Arc<InMemoryFormConfigSource>, FormId) {
    let forms = Arc::new(InMemoryFormConfigSource::new());
    let form_id = FormId::new();
    let mut config = it_helpdesk_template();
    if let Some(limits) = limits {
        config = config.with_limits(limits);
    }
    forms.register(form_id, config).await;
    (forms, form_id)
}

// =============================================================================
// Flows
// =============================================================================

#[tokio::test]
async fn helpdesk_conversation_completes_when_requirements_are_met() {
    let (source, ids) = InMemoryFormConfigSource::from_catalog(&TemplateCatalog::builtin()).await;
    let form_id = ids[IT_HELPDESK];
    let llm = MockLlm::new()
        .with_text("Hi! Sorry you're having trouble. What kind of problem is it?")
        .with_reply(LlmReply::text("That sounds frustrating. How urgent is this?").with_extractions(
            extracted(json!({
                "issueCategory": "hardware",
                "description": "Laptop screen flickers and then goes black after ten minutes"
            })),
            0.5,
        ))
        .with_reply(LlmReply::text("Thanks, I have what I need.").with_extractions(
            extracted(json!({"urgency": "high", "affectedUsers": 1})),
            0.85,
        ));
    let harness = Harness::new(
        Arc::new(source),
        Arc::new(InMemoryConversationStore::new()),
        llm.clone(),
    );

    let started = harness
        .start
        .handle(StartConversationCommand { form_id })
        .await
        .unwrap();
    let id = started.state.conversation_id();
    assert!(started.greeting.starts_with("Hi!"));

    let first = harness
        .send
        .handle(SendMessageCommand::new(id, "My laptop screen keeps going black"))
        .await
        .unwrap();
    assert!(!first.outcome.decision.should_complete);
    assert_eq!(first.outcome.missing_fields, vec!["urgency"]);
    assert_eq!(first.state.status(), ConversationStatus::Active);

    let second = harness
        .send
        .handle(SendMessageCommand::new(id, "Pretty urgent, I have a demo tomorrow"))
        .await
        .unwrap();
    assert_eq!(
        second.outcome.decision.reason,
        Some(CompletionReason::RequirementsMet)
    );
    assert!(second.outcome.missing_fields.is_empty());
    assert_eq!(second.state.status(), ConversationStatus::Completed);
    assert_eq!(second.state.turn_count(), 2);
    assert_eq!(second.state.confidence(), Fraction::new(0.85));
    assert_eq!(
        second.state.partial_extractions().get("issueCategory"),
        Some(&json!("hardware"))
    );

    let view = harness.get.handle(GetConversationQuery { conversation_id: id }).await.unwrap();
    assert_eq!(view.coverage.covered_required_topics, 3);
    assert_eq!(view.state.completion_reason(), Some(CompletionReason::RequirementsMet.as_str()));

    // Every call sees the dialogue so far, without the stored system message
    let calls = llm.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[2].messages.len(), 4);
    assert!(calls[0].system_prompt.contains("## Topics to cover"));
}

#[tokio::test]
async fn turn_budget_ends_conversation_with_missing_fields() {
    let (forms, form_id) = helpdesk_form(Some(ConversationLimits::new(2, 30, 0.7))).await;
    let llm = MockLlm::new()
        .with_text("Hello, what's up?")
        .with_text("Could you tell me more?")
        .with_text("Thanks, I'll pass this on.");
    let harness = Harness::new(forms, Arc::new(InMemoryConversationStore::new()), llm);

    let id = harness
        .start
        .handle(StartConversationCommand { form_id })
        .await
        .unwrap()
        .state
        .conversation_id();

    harness.send.handle(SendMessageCommand::new(id, "hi")).await.unwrap();
    let last = harness
        .send
        .handle(SendMessageCommand::new(id, "not sure"))
        .await
        .unwrap();

    let reason = last.outcome.decision.reason.unwrap();
    assert_eq!(reason, CompletionReason::MaxTurnsReached);
    assert!(reason.is_degraded());
    assert_eq!(
        last.outcome.missing_fields,
        vec!["issueCategory", "description", "urgency"]
    );

    let err = harness
        .send
        .handle(SendMessageCommand::new(id, "wait, one more thing"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::ConversationClosed);
}

#[tokio::test]
async fn fatal_provider_issue_moves_conversation_to_error() {
    let (forms, form_id) = helpdesk_form(None).await;
    let llm = MockLlm::new()
        .with_text("Hi, how can I help?")
        .with_reply(LlmReply::text("I can't continue this conversation.").with_fatal_issue("policy violation"));
    let store = Arc::new(InMemoryConversationStore::new());
    let harness = Harness::new(forms, store.clone(), llm);

    let id = harness
        .start
        .handle(StartConversationCommand { form_id })
        .await
        .unwrap()
        .state
        .conversation_id();
    let result = harness
        .send
        .handle(SendMessageCommand::new(id, "something off topic"))
        .await
        .unwrap();

    assert!(!result.outcome.decision.should_complete);
    let saved = store.load(id).await.unwrap().unwrap();
    assert_eq!(saved.status(), ConversationStatus::Error);
    assert_eq!(saved.error(), Some("policy violation"));
    assert!(saved.completed_at().is_some());
}

#[tokio::test]
async fn abandoned_conversation_rejects_further_turns() {
    let (forms, form_id) = helpdesk_form(None).await;
    let harness = Harness::new(
        forms,
        Arc::new(InMemoryConversationStore::new()),
        MockLlm::new().with_text("Hello!"),
    );

    let id = harness
        .start
        .handle(StartConversationCommand { form_id })
        .await
        .unwrap()
        .state
        .conversation_id();
    let abandoned = harness
        .abandon
        .handle(AbandonConversationCommand { conversation_id: id })
        .await
        .unwrap();
    assert_eq!(abandoned.status(), ConversationStatus::Abandoned);

    let err = harness
        .send
        .handle(SendMessageCommand::new(id, "are you there?"))
        .await
        .unwrap_err();
    assert!(matches!(err, TurnError::Conversation(_)));
}

#[tokio::test]
async fn file_store_persists_conversation_across_instances() {
    let temp_dir = TempDir::new().unwrap();
    let (forms, form_id) = helpdesk_form(None).await;
    let llm = MockLlm::new().with_text("Hello!").with_reply(
        LlmReply::text("Which device is it?").with_extractions(
            extracted(json!({"issueCategory": "network"})),
            0.4,
        ),
    );
    let harness = Harness::new(
        forms,
        Arc::new(FileConversationStore::new(temp_dir.path())),
        llm,
    );

    let id = harness
        .start
        .handle(StartConversationCommand { form_id })
        .await
        .unwrap()
        .state
        .conversation_id();
    let turn = harness
        .send
        .handle(SendMessageCommand::new(id, "wifi keeps dropping"))
        .await
        .unwrap();

    let reopened = FileConversationStore::new(temp_dir.path());
    let loaded = reopened.load(id).await.unwrap().unwrap();
    assert_eq!(loaded, turn.state);
    assert_eq!(loaded.topic("t1").map(|t| t.is_covered()), Some(true));
}
