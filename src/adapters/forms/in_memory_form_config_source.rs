//! In-Memory Form Config Source Adapter
//!
//! Maps form ids to configurations held in memory. Configurations can be
//! registered directly, loaded from YAML or seeded from a template catalog.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::conversation::{ConversationLimits, ConversationalFormConfig, TemplateCatalog};
use crate::domain::foundation::FormId;
use crate::ports::{FormConfigError, FormConfigSource};

/// In-memory lookup of form configurations
#[derive(Debug, Clone, Default)]
pub struct InMemoryFormConfigSource {
    forms: Arc<RwLock<HashMap<FormId, ConversationalFormConfig>>>,
    default_limits: Option<ConversationLimits>,
}

impl InMemoryFormConfigSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits applied to YAML forms that omit `conversationLimits`.
    pub fn with_default_limits(mut self, limits: ConversationLimits) -> Self {
        self.default_limits = Some(limits);
        self
    }

    /// Registers one form per catalog template and returns the assigned ids
    /// keyed by template name.
    pub async fn from_catalog(catalog: &TemplateCatalog) -> (Self, HashMap<String, FormId>) {
        let source = Self::new();
        let mut ids = HashMap::new();
        for key in catalog.keys() {
            if let Some(config) = catalog.get(key) {
                let form_id = FormId::new();
                source.register(form_id, config.clone()).await;
                ids.insert(key.to_string(), form_id);
            }
        }
        (source, ids)
    }

    pub async fn register(&self, form_id: FormId, config: ConversationalFormConfig) {
        self.forms.write().await.insert(form_id, config);
    }

    /// Parses a YAML form configuration and registers it.
    pub async fn register_yaml(&self, form_id: FormId, yaml: &str) -> Result<(), FormConfigError> {
        let config = match &self.default_limits {
            Some(limits) => parse_form_yaml_with_limits(yaml, limits)?,
            None => parse_form_yaml(yaml)?,
        };
        self.register(form_id, config).await;
        Ok(())
    }

    /// Reads a YAML form configuration from disk and registers it.
    pub async fn register_file(
        &self,
        form_id: FormId,
        path: impl AsRef<Path>,
    ) -> Result<(), FormConfigError> {
        let yaml = load_form_file(path).await?;
        self.register_yaml(form_id, &yaml).await
    }
}

/// Parses a form configuration from YAML (JSON is accepted as a YAML subset).
pub fn parse_form_yaml(yaml: &str) -> Result<ConversationalFormConfig, FormConfigError> {
    serde_yaml::from_str(yaml).map_err(|e| FormConfigError::Malformed(e.to_string()))
}

/// Parses a form configuration, filling in `limits` when the document has
/// no `conversationLimits` key.
pub fn parse_form_yaml_with_limits(
    yaml: &str,
    limits: &ConversationLimits,
) -> Result<ConversationalFormConfig, FormConfigError> {
    let mut value: serde_yaml::Value =
        serde_yaml::from_str(yaml).map_err(|e| FormConfigError::Malformed(e.to_string()))?;

    if let serde_yaml::Value::Mapping(map) = &mut value {
        let key = serde_yaml::Value::from("conversationLimits");
        if !map.contains_key(&key) {
            let limits = serde_yaml::to_value(limits)
                .map_err(|e| FormConfigError::Malformed(e.to_string()))?;
            map.insert(key, limits);
        }
    }

    serde_yaml::from_value(value).map_err(|e| FormConfigError::Malformed(e.to_string()))
}

/// Reads a form configuration file into a string.
pub async fn load_form_file(path: impl AsRef<Path>) -> Result<String, FormConfigError> {
    let path = path.as_ref();
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| FormConfigError::Unavailable(format!("{}: {}", path.display(), e)))
}

#[async_trait]
impl FormConfigSource for InMemoryFormConfigSource {
    async fn resolve(
        &self,
        form_id: FormId,
    ) -> Result<Option<ConversationalFormConfig>, FormConfigError> {
        Ok(self.forms.read().await.get(&form_id).cloned())
    }
}
