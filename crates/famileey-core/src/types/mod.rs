//! Core type definitions used across the Famileey workspace.

pub mod id;
pub mod ordering;
pub mod path;
pub mod time;
pub mod update;

pub use id::*;
pub use ordering::sort_by_child;
pub use time::now_millis;
pub use update::MultiPathUpdate;
