//! Direct chats, broadcast groups, read state, and presence.

pub mod direct;
pub mod group;

pub use direct::{ChatService, SentMessage};
pub use group::{BroadcastReceipt, GroupService};

use famileey_entity::chat::MessageType;

const PREVIEW_CHARS: usize = 100;

/// Notification text for a message body.
pub(crate) fn message_preview(text: &str, message_type: MessageType) -> String {
    match message_type {
        MessageType::Image => "sent a photo".to_string(),
        MessageType::Text if text.chars().count() > PREVIEW_CHARS => {
            let cut: String = text.chars().take(PREVIEW_CHARS).collect();
            format!("{cut}...")
        }
        MessageType::Text => text.to_string(),
    }
}
