//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors)
//! - `conversation` - Conversational form state machine and coverage engine

pub mod conversation;
pub mod foundation;
