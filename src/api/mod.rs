//! HTTP surface: shared state, the router and its middleware stack.

pub mod admin;
pub mod analytics;
pub mod auth;
pub mod chat;
pub mod conversations;
pub mod escalation;
pub mod knowledge;

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::RwLock;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::TokenSigner;
use crate::config::Config;
use crate::db::Database;
use crate::integrations::Integrations;
use crate::knowledge::KnowledgeStore;
use crate::pipeline::stt::SttClient;
use crate::pipeline::tts::TtsClient;
use crate::pipeline::Assistant;
use crate::ratelimit::{self, RateLimiter};
use crate::sessions::ChatSessions;
use crate::twilio;

use admin::AdminSettings;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Shared application state accessible from all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub db: Arc<Database>,
    pub tokens: Arc<TokenSigner>,
    pub assistant: Arc<Assistant>,
    pub stt: Arc<SttClient>,
    pub tts: Arc<TtsClient>,
    pub knowledge: Arc<KnowledgeStore>,
    pub sessions: Arc<ChatSessions>,
    /// Runtime settings editable through `/api/admin/settings`.
    pub settings: Arc<RwLock<AdminSettings>>,
    pub integrations: Arc<Integrations>,
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(config: Config, db: Database) -> Self {
        Self {
            db: Arc::new(db),
            tokens: Arc::new(TokenSigner::new(
                &config.auth.secret_key,
                config.auth.token_expire_minutes,
            )),
            assistant: Arc::new(Assistant::new(&config.openai.api_key, &config.openai.model)),
            stt: Arc::new(SttClient::new(
                config.openai.api_key.clone(),
                config.openai.whisper_model.clone(),
            )),
            tts: Arc::new(TtsClient::new(
                config.elevenlabs.api_key.clone(),
                config.elevenlabs.model.clone(),
            )),
            knowledge: Arc::new(KnowledgeStore::open(&config.knowledge, &config.openai)),
            sessions: Arc::new(ChatSessions::from_config(&config.sessions)),
            settings: Arc::new(RwLock::new(AdminSettings::from_config(&config))),
            integrations: Arc::new(Integrations::new(&config.integrations)),
            rate_limiter: Arc::new(RateLimiter::from_config(&config.rate_limit)),
            config,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.cors_origins);

    Router::new()
        // Auth
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/users", get(auth::list_users))
        // Chat
        .route("/api/chat/text", post(chat::text_chat))
        .route("/ws/voice/{session_id}", get(chat::voice_upgrade))
        // Conversation history
        .route("/api/conversations", get(conversations::list))
        .route(
            "/api/conversations/{id}",
            get(conversations::detail).delete(conversations::delete),
        )
        // Analytics
        .route("/api/analytics/summary", get(analytics::summary))
        .route("/api/analytics/timeline", get(analytics::timeline))
        // Knowledge base, escalation, admin
        .route("/api/knowledge/ingest", post(knowledge::ingest))
        .route("/api/escalation", post(escalation::escalate))
        .route(
            "/api/admin/settings",
            get(admin::get_settings).put(admin::update_settings),
        )
        // Twilio webhooks
        .route("/api/twilio/voice", post(twilio::webhook::handle_voice))
        .route(
            "/api/twilio/process-speech",
            post(twilio::webhook::handle_process_speech),
        )
        .route(
            "/api/twilio/status-callback",
            post(twilio::webhook::handle_status_callback),
        )
        // Health checks
        .route("/health", get(health))
        .route("/api/health", get(api_health))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            ratelimit::rate_limit,
        ))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    if origins.is_empty() || origins.iter().any(|o| o.trim() == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.trim().parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {origin}");
                None
            })
        })
        .collect();

    tracing::info!(origins = parsed.len(), "CORS restricted to configured origins");
    CorsLayer::new()
        .allow_origin(parsed)
        .allow_methods(methods)
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ])
        .allow_credentials(true)
}

fn handle_panic(err: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!("Handler panicked: {detail}");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": "Internal server error" })),
    )
        .into_response()
}

async fn health() -> &'static str {
    "ok"
}

async fn api_health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "app": state.config.identity.app_name,
        "version": VERSION,
    }))
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::*;

    pub fn state() -> AppState {
        let mut config = Config::default();
        config.knowledge.store_path =
            std::env::temp_dir().join(format!("voicebot-test-{}", uuid::Uuid::new_v4()));
        AppState::new(config, Database::in_memory().unwrap())
    }

    pub async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, value)
    }

    /// Register a user and return its token.
    pub async fn register(app: &Router, username: &str) -> String {
        let (status, body) = send(
            app,
            "POST",
            "/api/auth/register",
            None,
            Some(serde_json::json!({
                "username": username,
                "email": format!("{username}@example.com"),
                "password": "secret1",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["access_token"].as_str().unwrap().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use axum::body::Body;
    use axum::extract::ConnectInfo;
    use std::net::SocketAddr;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    #[tokio::test]
    async fn health_endpoints() {
        let app = router(state());
        let response = app
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"ok");

        let (status, body) = send(&app, "GET", "/api/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["app"], "AI Voice Chatbot");
        assert_eq!(body["version"], VERSION);
    }

    #[tokio::test]
    async fn rate_limit_returns_429() {
        let mut config = Config::default();
        config.rate_limit.per_minute = 2;
        config.knowledge.store_path = std::env::temp_dir().join("voicebot-test-unused");
        let app = router(AppState::new(config, Database::in_memory().unwrap()));

        for _ in 0..2 {
            assert_eq!(send(&app, "GET", "/api/health", None, None).await.0, StatusCode::OK);
        }
        let (status, body) = send(&app, "GET", "/api/health", None, None).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["retry_after"], 60);
    }

    #[tokio::test]
    async fn spoofed_forwarding_headers_still_hit_429() {
        let mut config = Config::default();
        config.rate_limit.per_minute = 2;
        config.knowledge.store_path = std::env::temp_dir().join("voicebot-test-unused");
        let app = router(AppState::new(config, Database::in_memory().unwrap()));
        let peer: SocketAddr = "10.0.0.7:5555".parse().unwrap();

        let mut statuses = Vec::new();
        for i in 0..4 {
            let request = Request::get("/api/health")
                .header("X-Forwarded-For", format!("192.0.2.{i}"))
                .extension(ConnectInfo(peer))
                .body(Body::empty())
                .unwrap();
            statuses.push(app.clone().oneshot(request).await.unwrap().status());
        }
        assert_eq!(
            statuses,
            [
                StatusCode::OK,
                StatusCode::OK,
                StatusCode::TOO_MANY_REQUESTS,
                StatusCode::TOO_MANY_REQUESTS
            ]
        );
    }

    #[test]
    fn panic_handler_hides_details() {
        let response = handle_panic(Box::new("secret detail"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
