//! File-based Conversation Store Adapter
//!
//! Stores each conversation as `<base>/<conversation_id>.yaml`.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::domain::conversation::ConversationState;
use crate::domain::foundation::ConversationId;
use crate::ports::{ConversationStore, StoreError};

/// File-based storage for conversation state
#[derive(Debug, Clone)]
pub struct FileConversationStore {
    base_path: PathBuf,
}

impl FileConversationStore {
    /// Create a new file store rooted at `base_path`
    ///
    /// The directory is created on first save.
    ///
    /// # Example
    /// ```ignore
    /// let store = FileConversationStore::new("./data/conversations");
    /// ```
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn state_file_path(&self, id: ConversationId) -> PathBuf {
        self.base_path.join(format!("{}.yaml", id))
    }
}

#[async_trait]
impl ConversationStore for FileConversationStore {
    async fn load(&self, id: ConversationId) -> Result<Option<ConversationState>, StoreError> {
        let file_path = self.state_file_path(id);

        let yaml = match fs::read_to_string(&file_path).await {
            Ok(yaml) => yaml,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::IoError(e.to_string())),
        };

        let state = serde_yaml::from_str(&yaml)
            .map_err(|e| StoreError::DeserializationFailed(e.to_string()))?;

        Ok(Some(state))
    }

    async fn save(&self, state: &ConversationState) -> Result<(), StoreError> {
        fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| StoreError::IoError(e.to_string()))?;

        let yaml = serde_yaml::to_string(state)
            .map_err(|e| StoreError::SerializationFailed(e.to_string()))?;

        // Atomic replace: write a sibling temp file, then rename
        let file_path = self.state_file_path(state.conversation_id());
        let tmp_path = file_path.with_extension("yaml.tmp");
        fs::write(&tmp_path, yaml)
            .await
            .map_err(|e| StoreError::IoError(e.to_string()))?;
        fs::rename(&tmp_path, &file_path)
            .await
            .map_err(|e| StoreError::IoError(e.to_string()))?;

        Ok(())
    }

    async fn delete(&self, id: ConversationId) -> Result<(), StoreError> {
        match fs::remove_file(self.state_file_path(id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::IoError(e.to_string())),
        }
    }

    async fn exists(&self, id: ConversationId) -> Result<bool, StoreError> {
        fs::try_exists(self.state_file_path(id))
            .await
            .map_err(|e| StoreError::IoError(e.to_string()))
    }
}
