// In crates/web-server/src/lib.rs

use app_config::types::ServerSettings;
use axum::{
    Router,
    extract::State,
    response::Json,
    routing::get,
};
use engine::StateStore;
use notifier::Notifier;
use std::sync::Arc;
use tokio::net::TcpListener;
use types::{ChatIdResponse, StateEntry, StatusResponse};

pub mod error;
pub mod types;

// Re-export our custom error type for convenience.
pub use error::{Error, Result};

const STATUS_MESSAGE: &str = "Bot is running!";
const TEST_MESSAGE: &str = "TEST: crossover bot is running!";

/// The shared application state that is available to all API handlers.
#[derive(Clone)]
pub struct AppState {
    pub notifier: Arc<dyn Notifier>,
    pub store: StateStore,
}

/// Creates the main application router with all routes and middleware.
pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        // `get` also answers HEAD, which uptime monitors use.
        .route("/", get(status_handler))
        .route("/test", get(test_notification_handler))
        .route("/id", get(chat_id_handler))
        .route("/health", get(health_check_handler))
        .route("/states", get(states_handler))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(app_state)
}

/// A simple health check handler.
async fn health_check_handler() -> &'static str {
    "OK"
}

/// The handler for `GET /`.
async fn status_handler() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: STATUS_MESSAGE.to_string(),
    })
}

/// Handler for `GET /test`. Sends a diagnostic message straight through the notifier.
async fn test_notification_handler(State(state): State<AppState>) -> Result<Json<StatusResponse>> {
    tracing::info!(notifier = state.notifier.name(), "Sending test notification.");
    state.notifier.send_message(TEST_MESSAGE).await?;
    Ok(Json(StatusResponse {
        status: "OK".to_string(),
    }))
}

/// Handler for `GET /id`
async fn chat_id_handler(State(state): State<AppState>) -> Json<ChatIdResponse> {
    Json(ChatIdResponse {
        chat_id: state.notifier.recipient().map(str::to_string),
    })
}

/// Handler for `GET /states`
async fn states_handler(State(state): State<AppState>) -> Json<Vec<StateEntry>> {
    Json(state.store.snapshot().into_iter().map(StateEntry::from).collect())
}

/// The main entry point for running the web server.
///
/// This function sets up the TCP listener and serves the application router.
/// It will run forever until the process is terminated.
pub async fn run(settings: ServerSettings, app_state: AppState) -> Result<()> {
    let app = create_router(app_state);

    let address = format!("{}:{}", settings.host, settings.port);
    let listener = TcpListener::bind(&address).await.map_err(Error::ServerBindError)?;
    tracing::info!("Web server listening on {}", address);

    axum::serve(listener, app.into_make_service())
        .await
        .map_err(Error::ServeError)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request, StatusCode};
    use core_types::{Crossover, PairKey, Symbol};
    use std::sync::Mutex;
    use tower::ServiceExt;

    enum Mode {
        Deliver,
        Unconfigured,
        Reject,
    }

    struct FakeNotifier {
        mode: Mode,
        sent: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Notifier for FakeNotifier {
        fn name(&self) -> &'static str {
            "Fake"
        }

        fn recipient(&self) -> Option<&str> {
            match self.mode {
                Mode::Unconfigured => None,
                _ => Some("-100123"),
            }
        }

        async fn send_message(&self, text: &str) -> notifier::Result<()> {
            match self.mode {
                Mode::Deliver => {
                    self.sent.lock().unwrap().push(text.to_string());
                    Ok(())
                }
                Mode::Unconfigured => Err(notifier::Error::NotConfigured),
                Mode::Reject => Err(notifier::Error::Rejected {
                    status: 403,
                    description: "Forbidden: bot was blocked by the user".to_string(),
                }),
            }
        }
    }

    fn app(mode: Mode) -> (Router, Arc<FakeNotifier>, StateStore) {
        let notifier = Arc::new(FakeNotifier {
            mode,
            sent: Mutex::new(Vec::new()),
        });
        let store = StateStore::new();
        let router = create_router(AppState {
            notifier: notifier.clone(),
            store: store.clone(),
        });
        (router, notifier, store)
    }

    async fn call(router: Router, method: Method, uri: &str) -> (StatusCode, Vec<u8>) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    #[tokio::test]
    async fn root_reports_status_for_get_and_head() {
        let (router, _, _) = app(Mode::Deliver);
        let (status, body) = call(router.clone(), Method::GET, "/").await;
        assert_eq!(status, StatusCode::OK);
        let parsed: StatusResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed.status, STATUS_MESSAGE);

        let (status, body) = call(router, Method::HEAD, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_endpoint_sends_through_the_notifier() {
        let (router, notifier, _) = app(Mode::Deliver);
        let (status, body) = call(router, Method::GET, "/test").await;
        assert_eq!(status, StatusCode::OK);
        let parsed: StatusResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed.status, "OK");
        assert_eq!(*notifier.sent.lock().unwrap(), vec![TEST_MESSAGE.to_string()]);
    }

    #[tokio::test]
    async fn test_endpoint_maps_notifier_failures() {
        let (router, _, _) = app(Mode::Unconfigured);
        let (status, _) = call(router, Method::GET, "/test").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let (router, _, _) = app(Mode::Reject);
        let (status, body) = call(router, Method::GET, "/test").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        let parsed: types::ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert!(parsed.error.contains("blocked"));
    }

    #[tokio::test]
    async fn id_reports_configured_recipient_or_null() {
        let (router, _, _) = app(Mode::Deliver);
        let (_, body) = call(router, Method::GET, "/id").await;
        let parsed: ChatIdResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed.chat_id.as_deref(), Some("-100123"));

        let (router, _, _) = app(Mode::Unconfigured);
        let (_, body) = call(router, Method::GET, "/id").await;
        assert_eq!(String::from_utf8(body).unwrap(), r#"{"chat_id":null}"#);
    }

    #[tokio::test]
    async fn states_lists_the_store_snapshot() {
        let (router, _, store) = app(Mode::Deliver);
        store.set(
            PairKey {
                symbol: Symbol::from("BTCUSDT"),
                timeframe: "15m".to_string(),
            },
            Crossover::Up,
        );

        let (status, body) = call(router, Method::GET, "/states").await;
        assert_eq!(status, StatusCode::OK);
        let parsed: Vec<StateEntry> = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            parsed,
            vec![StateEntry {
                symbol: "BTCUSDT".to_string(),
                timeframe: "15m".to_string(),
                direction: Crossover::Up,
            }]
        );
    }

    #[tokio::test]
    async fn health_is_plain_ok() {
        let (router, _, _) = app(Mode::Deliver);
        let (status, body) = call(router, Method::GET, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"OK");
    }
}
