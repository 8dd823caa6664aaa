//! User domain entities.

pub mod model;
pub mod role;

pub use model::{ProfileView, UPDATABLE_PROFILE_FIELDS, UserListing, UserProfile};
pub use role::UserRole;
