use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::auth::password::{hash_password_blocking, verify_password_blocking};
use crate::auth::store::{AuthError, CredentialStore, NewAccount};
use crate::models::user::UserAccount;

/// Per-process accounts keyed by username. Lost on restart.
#[derive(Default)]
pub struct MemoryCredentialStore {
    users: Mutex<HashMap<String, UserAccount>>,
}

impl MemoryCredentialStore {
    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, UserAccount>> {
        // A poisoned map still holds consistent entries; inserts are single calls.
        self.users.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn register(&self, account: NewAccount) -> Result<UserAccount, AuthError> {
        let account = account.normalized();
        let password_hash = hash_password_blocking(account.password.clone()).await?;

        let mut users = self.lock();
        if users.contains_key(&account.username) {
            return Err(AuthError::UsernameTaken);
        }
        if users.values().any(|u| u.email == account.email) {
            return Err(AuthError::EmailTaken);
        }

        let user = UserAccount {
            id: Uuid::new_v4(),
            username: account.username,
            email: account.email,
            full_name: account.full_name,
            password_hash,
            created_at: Utc::now(),
        };
        users.insert(user.username.clone(), user.clone());
        Ok(user)
    }

    async fn authenticate(&self, username: &str, password: &str) -> Result<UserAccount, AuthError> {
        let user = self
            .lock()
            .get(username.trim())
            .cloned()
            .ok_or(AuthError::InvalidCredentials)?;

        if verify_password_blocking(password.to_string(), user.password_hash.clone()).await? {
            Ok(user)
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserAccount>, AuthError> {
        Ok(self.lock().values().find(|u| u.id == id).cloned())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
