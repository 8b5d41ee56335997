//! Conversational LLM Port - the external model that talks to the user.
//!
//! Given the rendered system prompt and the transcript so far, a provider
//! returns the assistant's next reply and, when it can, structured field
//! values extracted from the conversation.
//!
//! # Example
//!
//! ```ignore
//! use async_trait::async_trait;
//!
//! struct EchoLlm;
//!
//! #[async_trait]
//! impl ConversationalLlm for EchoLlm {
//!     async fn respond(&self, _prompt: &str, messages: &[Message]) -> Result<LlmReply, ProviderError> {
//!         let last = messages.last().map(|m| m.content.clone()).unwrap_or_default();
//!         Ok(LlmReply::text(format!("You said: {}", last)))
//!     }
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::conversation::{Extractions, Message};

/// Port for the language model driving a conversation.
#[async_trait]
pub trait ConversationalLlm: Send + Sync {
    /// Produces the assistant's next turn.
    ///
    /// `messages` holds only user and assistant turns, oldest first; all
    /// system-level instruction arrives in `system_prompt`.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` on network, quota or model failure. The caller
    /// treats any error as "no state change".
    async fn respond(
        &self,
        system_prompt: &str,
        messages: &[Message],
    ) -> Result<LlmReply, ProviderError>;
}

/// One reply from the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmReply {
    /// Text shown to the user.
    pub assistant_text: String,

    /// Structured values extracted so far, keyed by schema field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extractions: Option<Extractions>,

    /// Provider's confidence in the extractions, 0.0 to 1.0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,

    /// Set when the provider hit an issue the conversation cannot recover from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fatal_issue: Option<String>,
}

impl LlmReply {
    /// Plain reply with no extractions.
    pub fn text(assistant_text: impl Into<String>) -> Self {
        Self {
            assistant_text: assistant_text.into(),
            ..Default::default()
        }
    }

    pub fn with_extractions(mut self, extractions: Extractions, confidence: f64) -> Self {
        self.extractions = Some(extractions);
        self.confidence = Some(confidence);
        self
    }

    pub fn with_fatal_issue(mut self, issue: impl Into<String>) -> Self {
        self.fatal_issue = Some(issue.into());
        self
    }
}

/// Errors from the LLM provider.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderError {
    /// Rate limited by provider.
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u32 },

    /// Provider is unavailable.
    #[error("provider unavailable: {message}")]
    Unavailable { message: String },

    /// Network error during request.
    #[error("network error: {0}")]
    Network(String),

    /// Request timed out.
    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// Failed to parse provider response.
    #[error("parse error: {0}")]
    Parse(String),

    /// Content was filtered for safety.
    #[error("content filtered: {reason}")]
    ContentFiltered { reason: String },

    /// API key or authentication failed.
    #[error("authentication failed")]
    AuthenticationFailed,
}

impl ProviderError {
    pub fn rate_limited(retry_after_secs: u32) -> Self {
        Self::RateLimited { retry_after_secs }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn timeout(timeout_secs: u64) -> Self {
        Self::Timeout { timeout_secs }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Returns true if retrying the same turn may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProviderError::RateLimited { .. }
                | ProviderError::Unavailable { .. }
                | ProviderError::Network(_)
                | ProviderError::Timeout { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn transient_errors_are_retryable() {
        assert!(ProviderError::rate_limited(5).is_retryable());
        assert!(ProviderError::unavailable("503").is_retryable());
        assert!(ProviderError::network("reset").is_retryable());
        assert!(ProviderError::timeout(60).is_retryable());
    }

    #[test]
    fn permanent_errors_are_not_retryable() {
        assert!(!ProviderError::AuthenticationFailed.is_retryable());
        assert!(!ProviderError::parse("bad json").is_retryable());
        assert!(!ProviderError::ContentFiltered {
            reason: "policy".to_string()
        }
        .is_retryable());
    }

    #[test]
    fn timeout_displays_duration() {
        assert_eq!(
            ProviderError::timeout(30).to_string(),
            "request timed out after 30s"
        );
    }

    #[test]
    fn reply_deserializes_from_provider_json() {
        let reply: LlmReply = serde_json::from_value(json!({
            "assistantText": "Which device?",
            "extractions": {"issueCategory": "hardware"},
            "confidence": 0.4
        }))
        .unwrap();

        assert_eq!(reply.assistant_text, "Which device?");
        assert_eq!(reply.extractions.unwrap()["issueCategory"], json!("hardware"));
        assert_eq!(reply.confidence, Some(0.4));
        assert_eq!(reply.fatal_issue, None);
    }
}
