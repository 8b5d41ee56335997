//! Mock conversational LLM for testing.
//!
//! Replays a queue of scripted replies and errors, records every call and can
//! simulate latency, so orchestration can be exercised without a provider.
//!
//! # Example
//!
//! ```ignore
//! let llm = MockLlm::new()
//!     .with_reply(LlmReply::text("Hi! What seems to be the problem?"))
//!     .with_error(ProviderError::network("connection reset"))
//!     .with_delay(Duration::from_millis(100));
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::conversation::Message;
use crate::ports::{ConversationalLlm, LlmReply, ProviderError};

/// Reply used once the script runs out.
pub const DEFAULT_MOCK_REPLY: &str = "Mock response";

/// One call received by the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub system_prompt: String,
    pub messages: Vec<Message>,
}

/// Scripted mock implementation of `ConversationalLlm`.
#[derive(Debug, Clone, Default)]
pub struct MockLlm {
    script: Arc<Mutex<VecDeque<Result<LlmReply, ProviderError>>>>,
    delay: Duration,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockLlm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful reply.
    pub fn with_reply(self, reply: LlmReply) -> Self {
        lock(&self.script).push_back(Ok(reply));
        self
    }

    /// Queues a plain text reply.
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_reply(LlmReply::text(text))
    }

    /// Queues a failure.
    pub fn with_error(self, error: ProviderError) -> Self {
        lock(&self.script).push_back(Err(error));
        self
    }

    /// Sets simulated latency per call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Queues a reply on an existing (possibly shared) mock.
    pub fn push_reply(&self, reply: LlmReply) {
        lock(&self.script).push_back(Ok(reply));
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    /// Replies still queued.
    pub fn remaining(&self) -> usize {
        lock(&self.script).len()
    }
}

#[async_trait]
impl ConversationalLlm for MockLlm {
    async fn respond(
        &self,
        system_prompt: &str,
        messages: &[Message],
    ) -> Result<LlmReply, ProviderError> {
        lock(&self.calls).push(RecordedCall {
            system_prompt: system_prompt.to_string(),
            messages: messages.to_vec(),
        });

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        let next = lock(&self.script).pop_front();
        next.unwrap_or_else(|| Ok(LlmReply::text(DEFAULT_MOCK_REPLY)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_script_in_order() {
        let llm = MockLlm::new()
            .with_text("first")
            .with_error(ProviderError::network("down"))
            .with_text("third");

        assert_eq!(llm.respond("p", &[]).await.unwrap().assistant_text, "first");
        assert_eq!(
            llm.respond("p", &[]).await.unwrap_err(),
            ProviderError::network("down")
        );
        assert_eq!(llm.respond("p", &[]).await.unwrap().assistant_text, "third");
        assert_eq!(llm.remaining(), 0);
    }

    #[tokio::test]
    async fn falls_back_to_default_reply() {
        let llm = MockLlm::new();
        let reply = llm.respond("p", &[]).await.unwrap();
        assert_eq!(reply.assistant_text, DEFAULT_MOCK_REPLY);
        assert!(reply.extractions.is_none());
    }

    #[tokio::test]
    async fn records_prompt_and_messages() {
        let llm = MockLlm::new();
        llm.respond("system prompt", &[Message::user("hello")]).await.unwrap();

        let calls = llm.calls();
        assert_eq!(llm.call_count(), 1);
        assert_eq!(calls[0].system_prompt, "system prompt");
        assert_eq!(calls[0].messages[0].content, "hello");
    }

    #[tokio::test]
    async fn clones_share_script() {
        let llm = MockLlm::new();
        let clone = llm.clone();
        llm.push_reply(LlmReply::text("shared"));

        assert_eq!(clone.respond("p", &[]).await.unwrap().assistant_text, "shared");
        assert_eq!(llm.call_count(), 1);
    }
}
