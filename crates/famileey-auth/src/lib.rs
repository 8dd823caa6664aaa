//! # famileey-auth
//!
//! Identity management for Famileey.
//!
//! ## Modules
//!
//! - `jwt` — custom token issuance and verification (HS256)
//! - `password` — Argon2id password hashing and length policy
//! - `identity` — the store-backed [`IdentityProvider`] implementation
//!
//! [`IdentityProvider`]: famileey_core::traits::IdentityProvider

pub mod identity;
pub mod jwt;
pub mod password;

pub use identity::StoreIdentityProvider;
pub use jwt::{Claims, JwtDecoder, JwtEncoder};
pub use password::{PasswordHasher, PasswordValidator};
