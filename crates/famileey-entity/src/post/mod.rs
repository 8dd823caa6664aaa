//! Post, like, and comment entities plus the feed views built from them.

pub mod feed;
pub mod model;

pub use feed::{CommentView, FamilySummary, PostView};
pub use model::{Comment, Like, Post, ViewCounter};
