//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `CONVERSATIONAL_FORMS`
//! prefix and nested values are separated by double underscores. Every
//! setting has a default, so an empty environment yields a usable config.
//!
//! # Example
//!
//! ```no_run
//! use conversational_forms::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Default turn budget: {}", config.engine.max_turns);
//! ```

mod ai;
mod engine;
mod error;
mod logging;

pub use ai::AiConfig;
pub use engine::EngineConfig;
pub use error::{ConfigError, ValidationError};
pub use logging::LoggingConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Conversation defaults and storage
    #[serde(default)]
    pub engine: EngineConfig,

    /// LLM call bounds
    #[serde(default)]
    pub ai: AiConfig,

    /// Tracing output
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `CONVERSATIONAL_FORMS` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `CONVERSATIONAL_FORMS__ENGINE__MAX_TURNS=10` -> `engine.max_turns = 10`
    /// - `CONVERSATIONAL_FORMS__LOGGING__JSON=true` -> `logging.json = true`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("CONVERSATIONAL_FORMS")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.engine.validate()?;
        self.ai.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}
