use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::{CredentialStore, MemoryCredentialStore, SqliteCredentialStore};
use crate::config::{Config, CredentialBackend};
use crate::generation::generator::{content_generator, ContentGenerator};
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// LLM-backed when `XAI_API_KEY` is usable, fallback templates otherwise.
    pub generator: Arc<dyn ContentGenerator>,
    pub credentials: Arc<dyn CredentialStore>,
    pub config: Config,
}

impl AppState {
    /// Wires the generator and credential store selected by `config`.
    pub fn build(config: Config, pool: SqlitePool) -> anyhow::Result<Self> {
        let llm = match &config.xai_api_key {
            Some(key) => Some(LlmClient::new(
                key.clone(),
                config.llm_api_url.clone(),
                config.llm_model.clone(),
            )?),
            None => None,
        };

        let credentials: Arc<dyn CredentialStore> = match config.credential_backend {
            CredentialBackend::Sqlite => Arc::new(SqliteCredentialStore::new(pool)),
            CredentialBackend::Memory => Arc::new(MemoryCredentialStore::default()),
        };

        Ok(AppState {
            generator: content_generator(llm),
            credentials,
            config,
        })
    }
}
