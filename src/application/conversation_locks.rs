//! Per-conversation serialization.
//!
//! Turns against one conversation read, modify and write the same record, so
//! they must not interleave. Different conversations never contend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::domain::foundation::ConversationId;

/// Map of conversation id to an async lock, shared by the command handlers.
#[derive(Debug, Clone, Default)]
pub struct ConversationLocks {
    locks: Arc<Mutex<HashMap<ConversationId, Arc<AsyncMutex<()>>>>>,
}

impl ConversationLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to a conversation.
    ///
    /// The guard releases the lock when dropped.
    pub async fn acquire(&self, id: ConversationId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            // Entries only the map still references are idle
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(id).or_default())
        };
        lock.lock_owned().await
    }

    /// Number of conversations with a live lock entry.
    pub fn tracked(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
