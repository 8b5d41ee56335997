//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Maximum turns must be at least 1")]
    InvalidMaxTurns,

    #[error("Maximum duration must be at least 1 minute")]
    InvalidMaxDuration,

    #[error("Minimum confidence must be between 0 and 1, got {0}")]
    InvalidMinConfidence(f64),

    #[error("Invalid AI request timeout")]
    InvalidTimeout,

    #[error("Invalid log filter: {0}")]
    InvalidLogLevel(String),
}
