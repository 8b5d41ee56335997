//! Conversation command and query handlers.

mod abandon_conversation;
mod errors;
mod get_conversation;
mod send_message;
mod start_conversation;

pub use abandon_conversation::{AbandonConversationCommand, AbandonConversationHandler};
pub use errors::{StartConversationError, TurnError};
pub use get_conversation::{ConversationView, GetConversationHandler, GetConversationQuery};
pub use send_message::{SendMessageCommand, SendMessageHandler, SendMessageResult};
pub use start_conversation::{
    StartConversationCommand, StartConversationHandler, StartConversationResult,
};
