//! Application layer - command handlers and turn orchestration.
//!
//! Handlers receive their ports as `Arc<dyn Trait>` and never touch adapters
//! directly.

pub mod conversation_driver;
pub mod conversation_locks;
pub mod handlers;

pub use conversation_driver::{ConversationDriver, DriverError, TurnOutcome};
pub use conversation_locks::ConversationLocks;
pub use handlers::*;
