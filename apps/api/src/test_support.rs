//! Shared test fixtures: a throwaway chat-completion server and an app builder.

use std::sync::{Arc, Mutex};

use axum::{
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_sessions_sqlx_store::SqliteStore;

use crate::config::Config;
use crate::db::{create_pool, run_migrations};
use crate::routes::build_router;
use crate::state::AppState;

#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub authorization: Option<String>,
    pub body: Value,
}

pub struct MockProvider {
    pub url: String,
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl MockProvider {
    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.captured.lock().unwrap().clone()
    }
}

/// Wraps `content` in a minimal chat-completion response body.
pub fn chat_reply(content: &str) -> Value {
    json!({
        "choices": [{"message": {"role": "assistant", "content": content}}],
        "usage": {"prompt_tokens": 12, "completion_tokens": 34}
    })
}

/// Serves `status` + `body` for every POST to `/v1/chat/completions` on an ephemeral port.
pub async fn spawn_mock_provider(status: StatusCode, body: Value) -> MockProvider {
    let captured = Arc::new(Mutex::new(Vec::new()));
    let handler_captured = captured.clone();

    let app = Router::new().route(
        "/v1/chat/completions",
        post(move |headers: HeaderMap, Json(request): Json<Value>| {
            let captured = handler_captured.clone();
            let body = body.clone();
            async move {
                captured.lock().unwrap().push(CapturedRequest {
                    authorization: headers
                        .get(AUTHORIZATION)
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string),
                    body: request,
                });
                (status, Json(body))
            }
        }),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockProvider {
        url: format!("http://{addr}/v1/chat/completions"),
        captured,
    }
}

/// Builds the full router (sessions included) over a fresh in-memory database.
pub async fn test_app(config: Config) -> Router {
    let pool = create_pool(&config.database_url).await.unwrap();
    run_migrations(&pool).await.unwrap();
    let session_store = SqliteStore::new(pool.clone());
    session_store.migrate().await.unwrap();

    let state = AppState::build(config, pool).unwrap();
    build_router(state, session_store)
}
