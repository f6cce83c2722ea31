pub mod health;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use sha2::{Digest, Sha512};
use time::Duration;
use tower_sessions::{cookie::Key, Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;

use crate::auth::{handlers as pages, session::require_api_login};
use crate::generation::handlers as generation;
use crate::render::handlers as render;
use crate::state::AppState;

/// Idle time after which a session is dropped.
pub const SESSION_IDLE_DAYS: i64 = 7;

/// Signing key for the session cookie: SHA-512 of the configured secret (64 bytes).
pub fn session_key(secret: &str) -> Key {
    Key::from(&Sha512::digest(secret.as_bytes()))
}

pub fn build_router(state: AppState, session_store: SqliteStore) -> Router {
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_expiry(Expiry::OnInactivity(Duration::days(SESSION_IDLE_DAYS)))
        .with_signed(session_key(&state.config.secret_key));

    // JSON API, gated on a logged-in session when REQUIRE_LOGIN is set
    let api = Router::new()
        .route(
            "/api/generate-resume",
            post(generation::handle_generate_resume),
        )
        .route(
            "/api/generate-cover-letter",
            post(generation::handle_generate_cover_letter),
        )
        .route("/api/download-pdf", post(render::handle_download_pdf))
        .route(
            "/api/download-cover-letter",
            post(render::handle_download_cover_letter),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_login,
        ));

    Router::new()
        .route("/health", get(health::health_handler))
        // Session pages
        .route("/", get(pages::index))
        .route("/login", get(pages::login_form).post(pages::login_submit))
        .route(
            "/register",
            get(pages::register_form).post(pages::register_submit),
        )
        .route("/logout", get(pages::logout))
        .merge(api)
        .layer(session_layer)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::{Config, CredentialBackend};
    use crate::test_support::{chat_reply, spawn_mock_provider, test_app};

    async fn body_bytes(response: Response) -> Vec<u8> {
        to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
    }

    async fn body_json(response: Response) -> Value {
        serde_json::from_slice(&body_bytes(response).await).unwrap()
    }

    fn json_request(uri: &str, body: Value, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn form_request(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    /// `name=value` of the response's session cookie.
    fn session_cookie(response: &Response) -> Option<String> {
        response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::to_string)
    }

    fn location(response: &Response) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    fn resume_body() -> Value {
        json!({
            "name": "Test User",
            "email": "test@example.com",
            "phone": "+1234567890",
            "skills": "Python, JavaScript, Rust",
            "education": "B.Tech CS",
            "experience": "Intern at Tech Corp",
            "projects": "Built web apps",
            "targetRole": "Software Engineer"
        })
    }

    const REGISTER_FORM: &str = "username=ada&email=ada%40example.com&full_name=Ada+Lovelace\
                                 &password=engine&confirm_password=engine";

    #[tokio::test]
    async fn test_health() {
        let app = test_app(Config::for_tests()).await;
        let response = app.oneshot(get_request("/health", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "resume-api");
        assert_eq!(body["generator"], "fallback");
    }

    #[tokio::test]
    async fn test_generate_resume_fallback() {
        let app = test_app(Config::for_tests()).await;
        let response = app
            .oneshot(json_request("/api/generate-resume", resume_body(), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["resume"]["skills"], json!(["Python", "JavaScript", "Rust"]));
        assert_eq!(body["personalInfo"]["name"], "Test User");
        assert_eq!(body["personalInfo"]["email"], "test@example.com");
    }

    #[tokio::test]
    async fn test_generate_resume_with_empty_body() {
        let app = test_app(Config::for_tests()).await;
        let response = app
            .oneshot(json_request("/api/generate-resume", json!({}), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["resume"]["skills"], json!([""]));
    }

    #[tokio::test]
    async fn test_malformed_json_is_validation_error() {
        let app = test_app(Config::for_tests()).await;
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/generate-resume")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_generate_cover_letter_fallback() {
        let app = test_app(Config::for_tests()).await;
        let response = app
            .oneshot(json_request(
                "/api/generate-cover-letter",
                json!({"name": "Ada", "targetRole": "Engineer", "company": "Acme"}),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let letter = body["coverLetter"].as_str().unwrap();
        assert!(letter.contains("Acme"));
        assert!(letter.contains("Ada"));
    }

    #[tokio::test]
    async fn test_download_pdf_with_empty_lists() {
        let app = test_app(Config::for_tests()).await;
        let response = app
            .oneshot(json_request(
                "/api/download-pdf",
                json!({
                    "resumeData": {"summary": "", "skills": [], "experience": [], "education": [], "projects": []},
                    "personalInfo": {"name": "", "email": "", "phone": ""}
                }),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/pdf"
        );
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"resume.pdf\""
        );
        let bytes = body_bytes(response).await;
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[tokio::test]
    async fn test_download_pdf_names_file_after_person() {
        let app = test_app(Config::for_tests()).await;
        let response = app
            .oneshot(json_request(
                "/api/download-pdf",
                json!({"resumeData": {}, "personalInfo": {"name": "Test User"}}),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"resume_Test_User.pdf\""
        );
    }

    #[tokio::test]
    async fn test_download_cover_letter() {
        let app = test_app(Config::for_tests()).await;
        let response = app
            .oneshot(json_request(
                "/api/download-cover-letter",
                json!({"coverLetter": "Dear Hiring Manager"}),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"cover_letter.txt\""
        );
        assert_eq!(body_bytes(response).await, b"Dear Hiring Manager".to_vec());
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let app = test_app(Config::for_tests()).await;
        let response = app.oneshot(get_request("/nope", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_api_requires_login_when_enabled() {
        let config = Config {
            require_login: true,
            ..Config::for_tests()
        };
        let app = test_app(config).await;
        let response = app
            .oneshot(json_request("/api/generate-resume", resume_body(), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_index_redirects_anonymous_users() {
        let app = test_app(Config::for_tests()).await;
        let response = app.oneshot(get_request("/", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(location(&response).starts_with("/login"));
    }

    #[tokio::test]
    async fn test_register_login_and_call_api() {
        let config = Config {
            require_login: true,
            ..Config::for_tests()
        };
        let app = test_app(config).await;

        let response = app
            .clone()
            .oneshot(form_request("/register", REGISTER_FORM, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");

        let response = app
            .clone()
            .oneshot(form_request("/login", "username=ada&password=engine", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");
        let cookie = session_cookie(&response).expect("login sets a session cookie");

        let response = app
            .clone()
            .oneshot(get_request("/", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = String::from_utf8(body_bytes(response).await).unwrap();
        assert!(html.contains("Ada Lovelace"));
        assert!(html.contains("Login successful!"));

        let response = app
            .clone()
            .oneshot(json_request("/api/generate-resume", resume_body(), Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(get_request("/logout", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(location(&response), "/login");
        let logged_out = session_cookie(&response).unwrap_or(cookie);

        let response = app
            .oneshot(json_request("/api/generate-resume", resume_body(), Some(&logged_out)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_login_honors_local_next_only() {
        let app = test_app(Config::for_tests()).await;
        app.clone()
            .oneshot(form_request("/register", REGISTER_FORM, None))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(form_request(
                "/login?next=/health",
                "username=ada&password=engine",
                None,
            ))
            .await
            .unwrap();
        assert_eq!(location(&response), "/health");

        let response = app
            .oneshot(form_request(
                "/login",
                "username=ada&password=engine&next=https%3A%2F%2Fevil.example",
                None,
            ))
            .await
            .unwrap();
        assert_eq!(location(&response), "/");
    }

    #[tokio::test]
    async fn test_wrong_password_rerenders_login() {
        let app = test_app(Config::for_tests()).await;
        app.clone()
            .oneshot(form_request("/register", REGISTER_FORM, None))
            .await
            .unwrap();
        let response = app
            .oneshot(form_request("/login", "username=ada&password=wrong", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let html = String::from_utf8(body_bytes(response).await).unwrap();
        assert!(html.contains("Invalid username or password"));
    }

    #[tokio::test]
    async fn test_duplicate_registration_is_conflict() {
        let config = Config {
            credential_backend: CredentialBackend::Memory,
            ..Config::for_tests()
        };
        let app = test_app(config).await;
        app.clone()
            .oneshot(form_request("/register", REGISTER_FORM, None))
            .await
            .unwrap();
        let response = app
            .oneshot(form_request("/register", REGISTER_FORM, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let html = String::from_utf8(body_bytes(response).await).unwrap();
        assert!(html.contains("Username already exists"));
    }

    #[tokio::test]
    async fn test_invalid_email_rerenders_register_form() {
        let app = test_app(Config::for_tests()).await;
        let response = app
            .clone()
            .oneshot(form_request(
                "/register",
                "username=ada&email=a%40&full_name=Ada&password=pw&confirm_password=pw",
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = String::from_utf8(body_bytes(response).await).unwrap();
        assert!(html.contains("Please enter a valid email address"));

        let response = app
            .oneshot(form_request("/login", "username=ada&password=pw", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_generate_resume_via_provider() {
        let reply = "Here you go:\n```json\n{\"summary\": \"Builder of things\", \
                     \"skills\": [\"Rust\"], \"experience\": [], \"education\": [], \
                     \"projects\": []}\n```";
        let provider = spawn_mock_provider(StatusCode::OK, chat_reply(reply)).await;
        let config = Config {
            xai_api_key: Some("test-key".to_string()),
            llm_api_url: provider.url.clone(),
            ..Config::for_tests()
        };
        let app = test_app(config).await;
        let response = app
            .oneshot(json_request("/api/generate-resume", resume_body(), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["resume"]["summary"], "Builder of things");
        assert_eq!(body["resume"]["skills"], json!(["Rust"]));

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].authorization.as_deref(), Some("Bearer test-key"));
    }

    #[tokio::test]
    async fn test_provider_failure_is_bad_gateway() {
        let provider = spawn_mock_provider(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({"error": {"message": "model overloaded"}}),
        )
        .await;
        let config = Config {
            xai_api_key: Some("test-key".to_string()),
            llm_api_url: provider.url.clone(),
            ..Config::for_tests()
        };
        let app = test_app(config).await;
        let response = app
            .oneshot(json_request("/api/generate-resume", resume_body(), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_json(response).await;
        assert_eq!(body["code"], "PROVIDER_ERROR");
        assert!(!body["error"].as_str().unwrap().contains("model overloaded"));
        assert_eq!(provider.requests().len(), 1);
    }
}
