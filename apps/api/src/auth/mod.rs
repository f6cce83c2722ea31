// Accounts and sessions: credential storage, password hashing, page flows.

pub mod handlers;
pub mod memory_store;
pub mod pages;
pub mod password;
pub mod session;
pub mod sqlite_store;
pub mod store;

pub use memory_store::MemoryCredentialStore;
pub use sqlite_store::SqliteCredentialStore;
pub use store::{AuthError, CredentialStore, NewAccount};
