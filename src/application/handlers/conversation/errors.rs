//! Caller-facing errors for conversation commands.

use thiserror::Error;

use crate::application::conversation_driver::DriverError;
use crate::domain::conversation::{ConfigurationError, ConversationError};
use crate::domain::foundation::{ConversationId, DomainError, ErrorCode, FormId};
use crate::ports::{FormConfigError, ProviderError, StoreError};

/// Errors from starting a conversation.
#[derive(Debug, Error)]
pub enum StartConversationError {
    #[error("Form not found: {0}")]
    FormNotFound(FormId),

    #[error("Invalid form configuration: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Form configuration unavailable: {0}")]
    FormSource(#[from] FormConfigError),

    #[error("AI provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Conversation error: {0}")]
    Conversation(#[from] ConversationError),
}

impl From<DriverError> for StartConversationError {
    fn from(err: DriverError) -> Self {
        match err {
            DriverError::Provider(e) => Self::Provider(e),
            DriverError::Conversation(e) => Self::Conversation(e),
        }
    }
}

impl StartConversationError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::FormNotFound(_) => ErrorCode::FormNotFound,
            Self::Configuration(_) => ErrorCode::InvalidConfiguration,
            Self::Provider(ProviderError::RateLimited { .. }) => ErrorCode::RateLimited,
            Self::Provider(_) => ErrorCode::AIProviderError,
            Self::FormSource(_) | Self::Storage(_) => ErrorCode::StorageError,
            Self::Conversation(_) => ErrorCode::InternalError,
        }
    }

    /// Message safe to show the end user.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::FormNotFound(_) => "This form could not be found.",
            Self::Provider(_) => "The assistant is unavailable right now. Please try again.",
            _ => "Something went wrong starting the conversation. Please try again later.",
        }
    }
}

/// Errors from commands and queries on an existing conversation.
#[derive(Debug, Error)]
pub enum TurnError {
    #[error("Validation error: message content cannot be empty")]
    EmptyMessage,

    #[error("Conversation not found: {0}")]
    NotFound(ConversationId),

    #[error("Form not found: {0}")]
    FormNotFound(FormId),

    #[error("AI provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Conversation error: {0}")]
    Conversation(#[from] ConversationError),

    #[error("Form configuration unavailable: {0}")]
    FormSource(#[from] FormConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl From<DriverError> for TurnError {
    fn from(err: DriverError) -> Self {
        match err {
            DriverError::Provider(e) => Self::Provider(e),
            DriverError::Conversation(e) => Self::Conversation(e),
        }
    }
}

impl TurnError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::EmptyMessage => ErrorCode::ValidationFailed,
            Self::NotFound(_) => ErrorCode::ConversationNotFound,
            Self::FormNotFound(_) => ErrorCode::FormNotFound,
            Self::Provider(ProviderError::RateLimited { .. }) => ErrorCode::RateLimited,
            Self::Provider(_) => ErrorCode::AIProviderError,
            Self::Conversation(ConversationError::TerminalState { .. }) => {
                ErrorCode::ConversationClosed
            }
            Self::Conversation(_) => ErrorCode::InvalidStateTransition,
            Self::FormSource(_) | Self::Storage(_) => ErrorCode::StorageError,
        }
    }

    /// True when the caller can resend the same message.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Provider(e) if e.is_retryable())
    }

    /// Message safe to show the end user. The transcript is kept in every case.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::EmptyMessage => "Please enter a message.",
            Self::NotFound(_) | Self::FormNotFound(_) => "This conversation could not be found.",
            Self::Provider(_) => "Something went wrong reaching the assistant. Please try again.",
            Self::Conversation(_) => "This conversation has already ended.",
            Self::FormSource(_) | Self::Storage(_) => {
                "Your message could not be saved. Please try again."
            }
        }
    }
}

impl From<StartConversationError> for DomainError {
    fn from(err: StartConversationError) -> Self {
        let domain = DomainError::new(err.code(), err.to_string());
        match &err {
            StartConversationError::FormNotFound(form_id) => {
                domain.with_detail("form_id", form_id.to_string())
            }
            _ => domain,
        }
    }
}

impl From<TurnError> for DomainError {
    fn from(err: TurnError) -> Self {
        let domain = DomainError::new(err.code(), err.to_string())
            .with_detail("retryable", err.is_retryable().to_string());
        match &err {
            TurnError::NotFound(id) => domain.with_detail("conversation_id", id.to_string()),
            TurnError::FormNotFound(form_id) => domain.with_detail("form_id", form_id.to_string()),
            _ => domain,
        }
    }
}
