use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::user::UserAccount;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Username already exists")]
    UsernameTaken,

    #[error("Email already registered")]
    EmailTaken,

    /// Unknown username and wrong password share this variant.
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error("password task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Registration input. The password is plaintext until the store hashes it.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password: String,
}

impl NewAccount {
    /// Usernames are trimmed and emails trimmed and lowercased before any lookup.
    pub fn normalized(mut self) -> Self {
        self.username = self.username.trim().to_string();
        self.email = self.email.trim().to_lowercase();
        self.full_name = self.full_name.trim().to_string();
        self
    }
}

/// Account storage with password verification.
///
/// Default: `SqliteCredentialStore`. `MemoryCredentialStore` keeps accounts per process.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Creates an account, or fails with `UsernameTaken` / `EmailTaken`.
    /// An existing account is never modified.
    async fn register(&self, account: NewAccount) -> Result<UserAccount, AuthError>;

    /// Returns the account when `password` verifies against its stored hash.
    async fn authenticate(&self, username: &str, password: &str) -> Result<UserAccount, AuthError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserAccount>, AuthError>;

    fn backend(&self) -> &'static str;
}
