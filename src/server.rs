//! HTTP API for the web chat client.
//!
//! - `GET /` answers `hello`.
//! - `POST /generate` takes `{ query, video_id?, thread_id }` and answers with the reply text.
//! - `POST /threads/{thread_id}/reset` starts a fresh thread and returns its id as JSON.

use crate::chat::ChatService;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

/// Shared application state.
pub struct AppState {
    pub chat: Arc<ChatService>,
}

impl AppState {
    pub fn new(chat: Arc<ChatService>) -> Self {
        Self { chat }
    }
}

/// Build the API router with permissive CORS.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(hello))
        .route("/generate", post(generate))
        .route("/threads/{thread_id}/reset", post(reset_thread))
        .layer(cors)
        .with_state(state)
}

// === Request/Response Types ===

/// Clients send thread ids as strings or as numbers.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ThreadId {
    Text(String),
    Number(i64),
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThreadId::Text(id) => write!(f, "{}", id),
            ThreadId::Number(id) => write!(f, "{}", id),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub query: String,
    #[serde(default)]
    pub video_id: Option<String>,
    pub thread_id: ThreadId,
}

#[derive(Debug, Serialize)]
struct ResetResponse {
    thread_id: String,
}

// === Handlers ===

async fn hello() -> &'static str {
    "hello"
}

async fn generate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerateRequest>,
) -> impl IntoResponse {
    let thread_id = req.thread_id.to_string();

    match state
        .chat
        .generate(&req.query, req.video_id.as_deref(), &thread_id)
        .await
    {
        Ok(reply) => (StatusCode::OK, reply),
        Err(e) => {
            error!("Generate failed for thread {}: {}", thread_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
    }
}

async fn reset_thread(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
) -> impl IntoResponse {
    match state.chat.reset(&thread_id) {
        Ok(new_id) => Json(ResetResponse { thread_id: new_id }).into_response(),
        Err(e) => {
            error!("Reset failed for thread {}: {}", thread_id, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{Agent, RuleReasoner, ToolContext};
    use crate::chunking::TextSplitter;
    use crate::embedding::HashingEmbedder;
    use crate::ingest::IngestionPipeline;
    use crate::rag::Retriever;
    use crate::session::SessionStore;
    use crate::transcript::{StaticTranscriptProvider, TranscriptCache};
    use crate::vector_store::{MemoryVectorStore, VectorIndex};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn app(dir: &TempDir) -> (Router, Arc<ChatService>) {
        let index = Arc::new(VectorIndex::new(
            Arc::new(HashingEmbedder::default()),
            Arc::new(MemoryVectorStore::new()),
        ));
        let ingestion = Arc::new(IngestionPipeline::new(
            Arc::new(StaticTranscriptProvider::demo()),
            TranscriptCache::new(dir.path()),
            TextSplitter::new(1000, 200).unwrap(),
            index.clone(),
        ));
        let agent = Agent::new(
            Arc::new(RuleReasoner::default()),
            ToolContext::new(Retriever::new(index), ingestion),
        );
        let chat = Arc::new(ChatService::new(Arc::new(SessionStore::new()), Arc::new(agent)));
        (router(Arc::new(AppState::new(chat.clone()))), chat)
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_root_says_hello() {
        let dir = TempDir::new().unwrap();
        let (app, _) = app(&dir);

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "hello");
    }

    #[tokio::test]
    async fn test_generate_returns_reply_text() {
        let dir = TempDir::new().unwrap();
        let (app, chat) = app(&dir);

        let response = app
            .oneshot(post_json(
                "/generate",
                serde_json::json!({ "query": "hello", "thread_id": 1 }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let text = body_text(response).await;
        assert!(!text.is_empty());
        assert_eq!(chat.sessions().history("1", 10).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_generate_scoped_by_video_id() {
        let dir = TempDir::new().unwrap();
        let (app, _) = app(&dir);

        let ingest = app
            .clone()
            .oneshot(post_json(
                "/generate",
                serde_json::json!({ "query": "add video video_014", "thread_id": "a" }),
            ))
            .await
            .unwrap();
        assert_eq!(ingest.status(), StatusCode::OK);

        let response = app
            .oneshot(post_json(
                "/generate",
                serde_json::json!({
                    "query": "What are Chronoc beans?",
                    "video_id": "video_014",
                    "thread_id": "b"
                }),
            ))
            .await
            .unwrap();
        assert!(body_text(response).await.contains("Chronoc beans"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_rejected() {
        let dir = TempDir::new().unwrap();
        let (app, _) = app(&dir);

        let response = app
            .oneshot(post_json("/generate", serde_json::json!({ "thread_id": 1 })))
            .await
            .unwrap();

        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn test_reset_returns_new_thread_id() {
        let dir = TempDir::new().unwrap();
        let (app, _) = app(&dir);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/threads/42/reset")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        let new_id = body["thread_id"].as_str().unwrap();
        assert_ne!(new_id, "42");
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let dir = TempDir::new().unwrap();
        let (app, _) = app(&dir);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header(header::ORIGIN, "http://localhost:5173")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
    }
}
