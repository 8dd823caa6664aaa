//! Direct chats, group chats, and their messages.

pub mod message;
pub mod model;
pub mod summary;

pub use message::{ChatMessage, LastMessage, MessageEntry, MessageStatus, MessageType};
pub use model::{DirectChat, GroupChat};
pub use summary::{ChatKind, ChatSummary, ParticipantView};
