use std::str::FromStr;

use anyhow::{bail, Context, Result};

use crate::llm_client::{DEFAULT_API_URL, DEFAULT_MODEL};

/// Placeholder credential shipped in sample `.env` files. Treated as "no key".
pub const PLACEHOLDER_API_KEY: &str = "xai-demo-key";

pub const DEFAULT_SECRET_KEY: &str = "your-secret-key-change-in-production";

/// Where user accounts live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialBackend {
    /// SQLite `users` table in the configured database.
    Sqlite,
    /// Per-process map, lost on restart.
    Memory,
}

impl FromStr for CredentialBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(CredentialBackend::Sqlite),
            "memory" => Ok(CredentialBackend::Memory),
            other => bail!("unknown credential backend '{other}' (expected 'sqlite' or 'memory')"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Every variable has a default, so a bare checkout runs in fallback mode.
#[derive(Debug, Clone)]
pub struct Config {
    /// `None` when unset, empty, or the placeholder key. Generation then uses the fallback templates.
    pub xai_api_key: Option<String>,
    pub llm_api_url: String,
    pub llm_model: String,
    pub database_url: String,
    pub secret_key: String,
    pub credential_backend: CredentialBackend,
    /// Gate `/api/*` behind a logged-in session.
    pub require_login: bool,
    pub pdf_footer: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            xai_api_key: normalize_api_key(optional_env("XAI_API_KEY")),
            llm_api_url: env_or("LLM_API_URL", DEFAULT_API_URL),
            llm_model: env_or("LLM_MODEL", DEFAULT_MODEL),
            database_url: env_or("DATABASE_URL", "sqlite://users.db?mode=rwc"),
            secret_key: env_or("SECRET_KEY", DEFAULT_SECRET_KEY),
            credential_backend: env_or("CREDENTIAL_BACKEND", "sqlite").parse()?,
            require_login: parse_bool(&env_or("REQUIRE_LOGIN", "true"))
                .context("REQUIRE_LOGIN must be true or false")?,
            pdf_footer: optional_env("PDF_FOOTER").filter(|f| !f.trim().is_empty()),
            port: env_or("PORT", "5000")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }

    /// True when the session secret was never changed from the built-in default.
    pub fn uses_default_secret(&self) -> bool {
        self.secret_key == DEFAULT_SECRET_KEY
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Drops blank keys and the demo placeholder so callers only see usable credentials.
pub fn normalize_api_key(raw: Option<String>) -> Option<String> {
    raw.map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty() && k != PLACEHOLDER_API_KEY)
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("invalid boolean '{other}'"),
    }
}

#[cfg(test)]
impl Config {
    /// Fallback-mode config backed by an in-memory SQLite database.
    pub fn for_tests() -> Self {
        Config {
            xai_api_key: None,
            llm_api_url: DEFAULT_API_URL.to_string(),
            llm_model: DEFAULT_MODEL.to_string(),
            database_url: "sqlite::memory:".to_string(),
            secret_key: "test-secret".to_string(),
            credential_backend: CredentialBackend::Sqlite,
            require_login: false,
            pdf_footer: None,
            port: 0,
            rust_log: "debug".to_string(),
        }
    }
}
