use async_trait::async_trait;
use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::password::{hash_password_blocking, verify_password_blocking};
use crate::auth::store::{AuthError, CredentialStore, NewAccount};
use crate::models::user::UserAccount;

/// Accounts in the `users` table. Duplicate checks and the insert share one immediate
/// transaction, and the UNIQUE constraints catch anything that races past the checks.
#[derive(Clone)]
pub struct SqliteCredentialStore {
    pool: SqlitePool,
}

impl SqliteCredentialStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Maps a UNIQUE violation on `users` to the matching domain error.
fn unique_violation(err: sqlx::Error) -> AuthError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return if db_err.message().contains("users.email") {
                AuthError::EmailTaken
            } else {
                AuthError::UsernameTaken
            };
        }
    }
    AuthError::Database(err)
}

/// Duplicate checks and the insert, run inside an open `BEGIN IMMEDIATE`.
async fn insert_account(
    conn: &mut SqliteConnection,
    account: NewAccount,
    password_hash: String,
) -> Result<UserAccount, AuthError> {
    let username_count: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM users WHERE username = ?")
        .bind(&account.username)
        .fetch_one(&mut *conn)
        .await?;
    if username_count > 0 {
        return Err(AuthError::UsernameTaken);
    }

    let email_count: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM users WHERE email = ?")
        .bind(&account.email)
        .fetch_one(&mut *conn)
        .await?;
    if email_count > 0 {
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

    sqlx::query(
        r#"
        INSERT INTO users (id, username, email, full_name, password_hash, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(user.id)
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.full_name)
    .bind(&user.password_hash)
    .bind(user.created_at)
    .execute(&mut *conn)
    .await
    .map_err(unique_violation)?;

    Ok(user)
}

/// Takes the write lock up front so concurrent registrations queue on the busy
/// timeout instead of failing a deferred read-to-write upgrade.
async fn register_locked(
    pool: SqlitePool,
    account: NewAccount,
    password_hash: String,
) -> Result<UserAccount, AuthError> {
    let mut conn = pool.acquire().await?;
    sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;

    let result = match insert_account(&mut conn, account, password_hash).await {
        Ok(user) => sqlx::query("COMMIT")
            .execute(&mut *conn)
            .await
            .map(|_| user)
            .map_err(unique_violation),
        Err(err) => Err(err),
    };

    if result.is_err() {
        let rollback = sqlx::query("ROLLBACK").execute(&mut *conn).await;
        if let Err(rollback_err) = rollback {
            // Never hand a connection with an open transaction back to the pool.
            warn!("Rollback failed, discarding connection: {rollback_err}");
            drop(conn.detach());
        }
    }
    result
}

#[async_trait]
impl CredentialStore for SqliteCredentialStore {
    async fn register(&self, account: NewAccount) -> Result<UserAccount, AuthError> {
        let account = account.normalized();
        let password_hash = hash_password_blocking(account.password.clone()).await?;

        // Spawned so a dropped request future cannot abandon the open transaction.
        let user =
            tokio::spawn(register_locked(self.pool.clone(), account, password_hash)).await??;

        info!("Registered user '{}' ({})", user.username, user.id);
        Ok(user)
    }

    async fn authenticate(&self, username: &str, password: &str) -> Result<UserAccount, AuthError> {
        let user = sqlx::query_as::<_, UserAccount>(
            r#"
            SELECT id, username, email, full_name, password_hash, created_at
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username.trim())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

        if verify_password_blocking(password.to_string(), user.password_hash.clone()).await? {
            Ok(user)
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserAccount>, AuthError> {
        let user = sqlx::query_as::<_, UserAccount>(
            r#"
            SELECT id, username, email, full_name, password_hash, created_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    fn backend(&self) -> &'static str {
        "sqlite"
    }
}
