//! Conversational Forms - topic coverage and extraction engine
//!
//! Runs a form as a dialogue: an LLM asks about the topics a form defines,
//! structured values are extracted from the replies, and the conversation
//! completes once required topics are covered with enough confidence or a
//! turn or time budget runs out.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
