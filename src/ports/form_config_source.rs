//! Form Config Source Port - resolves a form to its configuration.
//!
//! Configurations are read-only and assumed unchanged for the lifetime of a
//! conversation.

use async_trait::async_trait;

use crate::domain::conversation::ConversationalFormConfig;
use crate::domain::foundation::FormId;

/// Errors that can occur while resolving a form configuration.
#[derive(Debug, thiserror::Error)]
pub enum FormConfigError {
    #[error("Failed to read form configuration: {0}")]
    Unavailable(String),

    #[error("Form configuration is malformed: {0}")]
    Malformed(String),
}

/// Port for looking up the configuration of a form.
#[async_trait]
pub trait FormConfigSource: Send + Sync {
    /// Resolves a form id, `None` if the form is unknown.
    async fn resolve(&self, form_id: FormId)
        -> Result<Option<ConversationalFormConfig>, FormConfigError>;
}
