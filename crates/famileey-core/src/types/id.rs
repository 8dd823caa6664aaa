//! Newtype wrappers for every domain identifier.
//!
//! Identifiers are opaque strings in the store (user ids come from the
//! identity provider, the rest are generated here). Distinct types prevent
//! passing a `PostId` where a `UserId` is expected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to define a newtype ID wrapper around `String`.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Create a new time-ordered identifier.
            pub fn new() -> Self {
                Self(Uuid::now_v7().to_string())
            }

            /// Return the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the identifier and return the inner string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.to_string()))
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(
    /// Identity-provider subject of a user.
    UserId
);
define_id!(
    /// Unique identifier for a post.
    PostId
);
define_id!(
    /// Unique identifier for a comment under a post.
    CommentId
);
define_id!(
    /// Unique identifier for a 1:1 chat thread.
    ChatId
);
define_id!(
    /// Unique identifier for a group chat.
    GroupId
);
define_id!(
    /// Unique identifier for a chat or group message.
    MessageId
);
define_id!(
    /// Unique identifier for a notification.
    NotificationId
);
define_id!(
    /// Unique identifier for a reply to a notification.
    ReplyId
);
