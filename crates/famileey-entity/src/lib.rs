//! # famileey-entity
//!
//! Domain entity models for Famileey. Every struct in this crate is either a
//! record stored under a path of the hierarchical store or a view assembled
//! from several records for an API response. Stored records use camelCase
//! field names, matching the documents the mobile clients read directly.

pub mod chat;
pub mod notification;
pub mod post;
pub mod user;
