//! # famileey-core
//!
//! Core crate for the Famileey API. Contains the adapter traits for the
//! hosted key-value store, the identity provider and push delivery,
//! configuration schemas, typed identifiers, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Famileey crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
