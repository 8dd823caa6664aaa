//! Store providers and the manager that selects between them.

#[cfg(feature = "firebase")]
pub mod firebase;
pub mod manager;
#[cfg(feature = "memory")]
pub mod memory;

#[cfg(feature = "firebase")]
pub use firebase::FirebaseStore;
pub use manager::StoreManager;
#[cfg(feature = "memory")]
pub use memory::MemoryStore;
