use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct UserAccount {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    /// Argon2 PHC string. Never leaves the server.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}
