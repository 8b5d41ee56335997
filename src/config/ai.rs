//! AI call configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Bounds on calls to the conversational LLM
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl AiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate AI configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.timeout_secs == 0 || self.timeout_secs > 600 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ai_config_defaults() {
        assert_eq!(AiConfig::default().timeout_secs, 60);
    }

    #[test]
    fn test_timeout_duration() {
        let config = AiConfig { timeout_secs: 15 };
        assert_eq!(config.timeout(), Duration::from_secs(15));
    }

    #[test]
    fn test_validation_rejects_zero_timeout() {
        let config = AiConfig { timeout_secs: 0 };
        assert_eq!(config.validate(), Err(ValidationError::InvalidTimeout));
    }
}
