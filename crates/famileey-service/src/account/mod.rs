//! Accounts: registration, sign-in, and profiles.

pub mod profile;
pub mod registration;
pub mod service;

pub use profile::ProfileReader;
pub use registration::RegistrationRequest;
pub use service::AccountService;
