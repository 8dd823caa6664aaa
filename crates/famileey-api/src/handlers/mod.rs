//! Route handlers organized by domain.

pub mod account;
pub mod admin;
pub mod family;
pub mod health;
pub mod messaging;
pub mod notification;
pub mod post;
pub mod profile_page;
