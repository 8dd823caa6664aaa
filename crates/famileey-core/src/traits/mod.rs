//! Core traits defined in `famileey-core` and implemented by other crates.

pub mod identity;
pub mod push;
pub mod store;

pub use identity::{IdentityProvider, NewIdentity, VerifiedIdentity};
pub use push::{PushMessage, PushSender, PushTicket};
pub use store::{KeyValueStore, TransactionFn, TransactionResult};
