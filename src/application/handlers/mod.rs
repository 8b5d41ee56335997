//! Command and query handlers.

pub mod conversation;

pub use conversation::*;
