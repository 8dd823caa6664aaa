//! Notification fan-out, the per-user notification log, and push delivery.

pub mod disabled;
pub mod expo;
pub mod service;

pub use disabled::DisabledPushSender;
pub use expo::{ExpoPushClient, is_expo_push_token};
pub use service::NotificationService;
