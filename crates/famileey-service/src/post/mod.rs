//! Posts, likes, and comments.

pub mod engagement;
pub mod service;

pub use engagement::EngagementReader;
pub use service::{NewPost, PostService};
