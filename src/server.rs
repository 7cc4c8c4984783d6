//! HTTP adapter for the dashboard session
//!
//! A thin axum layer over [`Session`]: the page itself, a health probe,
//! and JSON endpoints for upload and generation. All state lives in
//! [`AppState`]; the provider is injected at construction and shared
//! across requests.

use crate::config::Config;
use crate::error::Result;
use crate::providers::Provider;
use crate::session::Session;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Json};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Shared state handed to every request handler
#[derive(Clone)]
pub struct AppState {
    /// The single dashboard session, serialized behind a lock
    pub session: Arc<Mutex<Session>>,
    /// Injected completion provider
    pub provider: Arc<dyn Provider>,
}

impl AppState {
    /// Create application state from a config and provider
    pub fn new(config: &Config, provider: Arc<dyn Provider>) -> Self {
        Self {
            session: Arc::new(Mutex::new(Session::new(config.generation.clone()))),
            provider,
        }
    }
}

/// Upload request body
#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    /// Original filename, used for format detection
    pub filename: String,
    /// Base64 or data-URL payload
    pub contents: String,
}

/// Generation request body
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    /// Natural-language chart description
    pub prompt: String,
}

/// Build the dashboard router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/upload", post(upload))
        .route("/api/generate", post(generate))
        .with_state(state)
}

/// Bind and serve the dashboard until the process is stopped
///
/// # Errors
///
/// Returns error if the address cannot be bound
pub async fn serve(config: &Config, provider: Arc<dyn Provider>) -> Result<()> {
    let addr = config.server.bind_addr();
    let state = AppState::new(config, provider);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Dashboard listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn index() -> Html<&'static str> {
    Html(include_str!("../assets/index.html"))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn upload(
    State(state): State<AppState>,
    Json(request): Json<UploadRequest>,
) -> impl IntoResponse {
    let request_id = Uuid::new_v4();
    tracing::info!(%request_id, filename = %request.filename, "Upload request");

    let mut session = state.session.lock().await;
    let outcome = session.handle_upload(&request.contents, &request.filename);

    let status = if outcome.ok {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    (status, Json(outcome))
}

async fn generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> impl IntoResponse {
    let request_id = Uuid::new_v4();
    tracing::info!(%request_id, "Generation request");

    let mut session = state.session.lock().await;
    let outcome = session.generate(&request.prompt, state.provider.as_ref()).await;

    tracing::info!(
        %request_id,
        has_figure = outcome.figure.is_some(),
        has_error = outcome.error.is_some(),
        "Generation finished"
    );
    Json(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockProvider;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;
    use tower::util::ServiceExt;

    const CSV: &str = "year,value\n2010,1\n2015,2\n2020,3\n";

    fn app(responses: Vec<&str>) -> Router {
        let state = AppState::new(
            &Config::default(),
            Arc::new(MockProvider::new(responses)),
        );
        router(state)
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn upload_body() -> serde_json::Value {
        json!({
            "filename": "data.csv",
            "contents": BASE64.encode(CSV.as_bytes()),
        })
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(vec![])
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_index_serves_page() {
        let response = app(vec![])
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let page = String::from_utf8_lossy(&bytes);
        assert!(page.contains("<html"));
        // Generation stays disabled until an upload succeeds
        assert!(page.contains(r#"<button id="generate" disabled>"#));
        // Commentary renders as markdown
        assert!(page.contains("marked.parse"));
    }

    #[tokio::test]
    async fn test_upload_success() {
        let response = app(vec![])
            .oneshot(post_json("/api/upload", upload_body()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["ok"], true);
        assert_eq!(body["stats"]["records"], 3);
        assert_eq!(body["stats"]["date_range"], "2010 - 2020");
        assert_eq!(body["preview"]["columns"][0]["field"], "year");
    }

    #[tokio::test]
    async fn test_upload_failure() {
        let body = json!({ "filename": "data.csv", "contents": "!!!" });
        let response = app(vec![])
            .oneshot(post_json("/api/upload", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        assert_eq!(body["ok"], false);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_generate_without_dataset_refused() {
        let response = app(vec!["unused"])
            .oneshot(post_json("/api/generate", json!({ "prompt": "bar chart" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("Upload a dataset"));
        assert!(body.get("figure").is_none());
    }

    #[tokio::test]
    async fn test_upload_then_generate() {
        let response = "Chart:\n```python\nfig = px.bar(df, x=\"year\", y=\"value\")\n```";
        let app = app(vec![response]);

        let response = app
            .clone()
            .oneshot(post_json("/api/upload", upload_body()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(post_json("/api/generate", json!({ "prompt": "bar chart" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["figure"]["data"][0]["type"], "bar");
        assert_eq!(
            body["commentary"],
            "Chart:\n```python\nfig = px.bar(df, x=\"year\", y=\"value\")\n```"
        );
        assert!(body.get("error").is_none());
    }
}
