//! Login state and one-shot flash messages kept in the `tower-sessions` session.
//!
//! - [`USER_ID_KEY`] holds the logged-in account's UUID.
//! - [`FLASH_KEY`] holds messages queued for the next rendered page; reading them clears them.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::UserAccount;
use crate::state::AppState;

pub const USER_ID_KEY: &str = "user_id";
pub const FLASH_KEY: &str = "_flashes";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Error,
}

impl FlashLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            FlashLevel::Success => "success",
            FlashLevel::Info => "info",
            FlashLevel::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

pub async fn push_flash(
    session: &Session,
    level: FlashLevel,
    message: impl Into<String>,
) -> Result<(), AppError> {
    let mut flashes: Vec<Flash> = session.get(FLASH_KEY).await?.unwrap_or_default();
    flashes.push(Flash {
        level,
        message: message.into(),
    });
    session.insert(FLASH_KEY, flashes).await?;
    Ok(())
}

/// Returns and clears the queued flash messages.
pub async fn take_flashes(session: &Session) -> Result<Vec<Flash>, AppError> {
    Ok(session
        .remove::<Vec<Flash>>(FLASH_KEY)
        .await?
        .unwrap_or_default())
}

/// Marks the session as belonging to `user`. The session id is rotated first.
pub async fn log_in(session: &Session, user: &UserAccount) -> Result<(), AppError> {
    session.cycle_id().await?;
    session.insert(USER_ID_KEY, user.id).await?;
    Ok(())
}

pub async fn log_out(session: &Session) -> Result<(), AppError> {
    session.remove::<Uuid>(USER_ID_KEY).await?;
    session.cycle_id().await?;
    Ok(())
}

pub async fn current_user_id(session: &Session) -> Result<Option<Uuid>, AppError> {
    Ok(session.get::<Uuid>(USER_ID_KEY).await?)
}

/// Resolves the session's account. A stale id (account gone) is treated as logged out.
pub async fn current_user(
    state: &AppState,
    session: &Session,
) -> Result<Option<UserAccount>, AppError> {
    match current_user_id(session).await? {
        Some(id) => Ok(state.credentials.find_by_id(id).await?),
        None => Ok(None),
    }
}

/// Middleware for `/api/*`: answers 401 in the error envelope when login is required
/// and the session has no user.
pub async fn require_api_login(
    State(state): State<AppState>,
    session: Session,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if state.config.require_login && current_user(&state, &session).await?.is_none() {
        return Err(AppError::Unauthorized);
    }
    Ok(next.run(request).await)
}
