//! Conversation engine configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;
use crate::domain::conversation::ConversationLimits;

/// Engine defaults and storage location
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Turn ceiling for forms that do not set one
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,

    /// Duration ceiling in minutes for forms that do not set one
    #[serde(default = "default_max_duration_minutes")]
    pub max_duration_minutes: u32,

    /// Confidence threshold for forms that do not set one
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,

    /// Directory for YAML conversation files; in-memory storage when unset
    pub storage_dir: Option<PathBuf>,
}

impl EngineConfig {
    /// Limits applied to form templates that omit `conversationLimits`
    pub fn default_limits(&self) -> ConversationLimits {
        ConversationLimits::new(self.max_turns, self.max_duration_minutes, self.min_confidence)
    }

    /// Validate engine configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_turns == 0 {
            return Err(ValidationError::InvalidMaxTurns);
        }
        if self.max_duration_minutes == 0 {
            return Err(ValidationError::InvalidMaxDuration);
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(ValidationError::InvalidMinConfidence(self.min_confidence));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
            max_duration_minutes: default_max_duration_minutes(),
            min_confidence: default_min_confidence(),
            storage_dir: None,
        }
    }
}

fn default_max_turns() -> u32 {
    20
}

fn default_max_duration_minutes() -> u32 {
    30
}

fn default_min_confidence() -> f64 {
    0.7
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Fraction;

    #[test]
    fn test_engine_defaults_match_form_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.default_limits(), ConversationLimits::default());
        assert!(config.storage_dir.is_none());
    }

    #[test]
    fn test_default_limits_use_configured_values() {
        let config = EngineConfig {
            max_turns: 8,
            max_duration_minutes: 12,
            min_confidence: 0.4,
            storage_dir: None,
        };
        let limits = config.default_limits();
        assert_eq!(limits.max_turns, 8);
        assert_eq!(limits.max_duration, 12);
        assert_eq!(limits.min_confidence, Fraction::new(0.4));
    }

    #[test]
    fn test_validation_rejects_zero_turns() {
        let config = EngineConfig {
            max_turns: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidMaxTurns));
    }

    #[test]
    fn test_validation_rejects_zero_duration() {
        let config = EngineConfig {
            max_duration_minutes: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidMaxDuration));
    }

    #[test]
    fn test_validation_rejects_confidence_out_of_range() {
        let config = EngineConfig {
            min_confidence: 1.2,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidMinConfidence(1.2))
        );
    }
}
