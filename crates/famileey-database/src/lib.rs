//! # famileey-database
//!
//! Hierarchical key-value store providers (in-memory tree and the hosted
//! realtime database over REST) and the repositories that own the path
//! layout of every Famileey entity.

pub mod repositories;
pub mod store;

pub use store::StoreManager;
