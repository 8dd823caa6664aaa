//! Store-backed identity provider.

pub mod store;

pub use store::StoreIdentityProvider;
