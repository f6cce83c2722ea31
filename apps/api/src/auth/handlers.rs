//! Session page flows: index, login, register, logout.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, warn};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::auth::pages;
use crate::auth::session::{self, Flash, FlashLevel};
use crate::auth::{AuthError, NewAccount};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct NextParam {
    pub next: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub next: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct RegisterForm {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Please enter a valid email address")
    )]
    pub email: String,
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,
    #[validate(custom(function = "not_blank", message = "Password is required"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,
}

impl RegisterForm {
    fn trimmed(self) -> Self {
        Self {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            full_name: self.full_name.trim().to_string(),
            ..self
        }
    }
}

fn not_blank(password: &str) -> Result<(), ValidationError> {
    if password.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

/// Form fields in the order they are shown; the first failing one is reported.
const REGISTER_FIELDS: [&str; 5] = ["username", "email", "full_name", "password", "confirm_password"];

/// Only same-site absolute paths are followed after login.
pub fn safe_next(next: Option<&str>) -> Option<&str> {
    next.filter(|n| n.starts_with('/') && !n.starts_with("//") && !n.contains('\\'))
}

fn error_flash(message: impl Into<String>) -> Flash {
    Flash {
        level: FlashLevel::Error,
        message: message.into(),
    }
}

/// GET /
pub async fn index(State(state): State<AppState>, session: Session) -> Result<Response, AppError> {
    let Some(user) = session::current_user(&state, &session).await? else {
        session::push_flash(&session, FlashLevel::Info, "Please log in to access this page.")
            .await?;
        return Ok(Redirect::to("/login?next=/").into_response());
    };
    let flashes = session::take_flashes(&session).await?;
    Ok(Html(pages::index_page(&user, &flashes)).into_response())
}

/// GET /login
pub async fn login_form(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<NextParam>,
) -> Result<Response, AppError> {
    if session::current_user(&state, &session).await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    let flashes = session::take_flashes(&session).await?;
    let next = safe_next(params.next.as_deref());
    Ok(Html(pages::login_page(&flashes, next)).into_response())
}

/// POST /login
pub async fn login_submit(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<NextParam>,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let next = form.next.as_deref().or(params.next.as_deref());
    let next = safe_next(next);

    match state.credentials.authenticate(&form.username, &form.password).await {
        Ok(user) => {
            session::log_in(&session, &user).await?;
            session::push_flash(&session, FlashLevel::Success, "Login successful!").await?;
            info!("User '{}' logged in", user.username);
            Ok(Redirect::to(next.unwrap_or("/")).into_response())
        }
        Err(AuthError::InvalidCredentials) => {
            warn!("Failed login for '{}'", form.username.trim());
            let mut flashes = session::take_flashes(&session).await?;
            flashes.push(error_flash("Invalid username or password"));
            Ok((
                StatusCode::UNAUTHORIZED,
                Html(pages::login_page(&flashes, next)),
            )
                .into_response())
        }
        Err(other) => Err(other.into()),
    }
}

/// GET /register
pub async fn register_form(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    if session::current_user(&state, &session).await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    let flashes = session::take_flashes(&session).await?;
    Ok(Html(pages::register_page(&flashes)).into_response())
}

fn first_message(errors: &ValidationErrors) -> String {
    let fields = errors.field_errors();
    REGISTER_FIELDS
        .iter()
        .filter_map(|name| fields.get(*name))
        .find_map(|errs| errs.iter().find(|e| e.code == "length").or_else(|| errs.first()))
        .and_then(|e| e.message.as_ref())
        .map(|m| m.to_string())
        .unwrap_or_else(|| "Please check the registration details".to_string())
}

fn validate_registration(form: &RegisterForm) -> Result<(), String> {
    form.validate().map_err(|errors| first_message(&errors))
}

/// POST /register
pub async fn register_submit(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    let form = form.trimmed();
    if let Err(message) = validate_registration(&form) {
        return Ok((
            StatusCode::BAD_REQUEST,
            Html(pages::register_page(&[error_flash(message)])),
        )
            .into_response());
    }

    let account = NewAccount {
        username: form.username,
        email: form.email,
        full_name: form.full_name,
        password: form.password,
    };

    match state.credentials.register(account).await {
        Ok(_) => {
            session::push_flash(
                &session,
                FlashLevel::Success,
                "Registration successful! Please log in.",
            )
            .await?;
            Ok(Redirect::to("/login").into_response())
        }
        Err(err @ (AuthError::UsernameTaken | AuthError::EmailTaken)) => Ok((
            StatusCode::CONFLICT,
            Html(pages::register_page(&[error_flash(err.to_string())])),
        )
            .into_response()),
        Err(other) => Err(other.into()),
    }
}

/// GET /logout
pub async fn logout(session: Session) -> Result<Response, AppError> {
    session::log_out(&session).await?;
    session::push_flash(&session, FlashLevel::Info, "You have been logged out.").await?;
    Ok(Redirect::to("/login").into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> RegisterForm {
        RegisterForm {
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
            full_name: "Ada Lovelace".to_string(),
            password: "engine".to_string(),
            confirm_password: "engine".to_string(),
        }
    }

    #[test]
    fn test_safe_next_rejects_offsite_targets() {
        assert_eq!(safe_next(Some("/")), Some("/"));
        assert_eq!(safe_next(Some("/api/x?y=1")), Some("/api/x?y=1"));
        assert_eq!(safe_next(Some("//evil.example")), None);
        assert_eq!(safe_next(Some("https://evil.example")), None);
        assert_eq!(safe_next(Some("/\\evil.example")), None);
        assert_eq!(safe_next(None), None);
    }

    #[test]
    fn test_registration_validation() {
        assert!(validate_registration(&form()).is_ok());

        let mut missing = form();
        missing.username = "  ".to_string();
        assert_eq!(
            validate_registration(&missing.trimmed()).unwrap_err(),
            "Username is required"
        );

        let mut mismatch = form();
        mismatch.confirm_password = "other".to_string();
        assert_eq!(validate_registration(&mismatch).unwrap_err(), "Passwords do not match");

        let mut blank_password = form();
        blank_password.password = "   ".to_string();
        blank_password.confirm_password = "   ".to_string();
        assert_eq!(validate_registration(&blank_password).unwrap_err(), "Password is required");
    }

    #[test]
    fn test_registration_rejects_malformed_emails() {
        for email in ["nope", "@", "a@", "@@@", "x @ y", "@example.com"] {
            let mut bad = form();
            bad.email = email.to_string();
            assert_eq!(
                validate_registration(&bad).unwrap_err(),
                "Please enter a valid email address",
                "accepted {email:?}"
            );
        }

        let mut empty = form();
        empty.email = String::new();
        assert_eq!(validate_registration(&empty).unwrap_err(), "Email is required");
    }

    #[test]
    fn test_registration_fields_are_trimmed_first() {
        let padded = RegisterForm {
            username: "  ada ".to_string(),
            email: " ada@example.com ".to_string(),
            full_name: " Ada Lovelace".to_string(),
            ..form()
        }
        .trimmed();
        assert!(validate_registration(&padded).is_ok());
        assert_eq!(padded.username, "ada");
        assert_eq!(padded.password, "engine");

        let spaces = RegisterForm {
            full_name: "   ".to_string(),
            ..form()
        }
        .trimmed();
        assert_eq!(validate_registration(&spaces).unwrap_err(), "Full name is required");
    }
}
