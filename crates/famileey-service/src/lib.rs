//! # famileey-service
//!
//! Business logic service layer for Famileey. Each service orchestrates
//! repositories, the identity provider, and push delivery to implement the
//! application's use cases: accounts, the social graph and feed, posts,
//! messaging, and notifications.
//!
//! Services follow constructor injection: all dependencies are provided at
//! construction time, and the shared store handle is never a global.

pub mod account;
pub mod admin;
pub mod context;
pub mod family;
pub mod messaging;
pub mod notification;
pub mod post;

#[cfg(test)]
mod testing;

pub use account::{AccountService, ProfileReader, RegistrationRequest};
pub use admin::AdminService;
pub use context::RequestContext;
pub use family::{FeedService, GraphService};
pub use messaging::{BroadcastReceipt, ChatService, GroupService, SentMessage};
pub use notification::{DisabledPushSender, ExpoPushClient, NotificationService};
pub use post::{EngagementReader, NewPost, PostService};
