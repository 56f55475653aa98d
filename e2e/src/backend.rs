//! Mock provider server that simulates an OpenAI-compatible streaming API
//!
//! Tests pre-configure SSE scripts via SharedBackendState before each request.

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use futures::StreamExt;
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::types::{BackendState, MockResponse, ReceivedRequest, SharedBackendState};

/// Default models list returned by /v1/models
fn default_models_response() -> &'static str {
    r#"{"object":"list","data":[{"id":"e2e-model","object":"model","created":1700000000,"owned_by":"e2e"}]}"#
}

/// Default fallback response when no response is queued
fn default_completion_response() -> MockResponse {
    MockResponse::sse(
        "data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"Default response (no mock queued)\"}}]}\n\ndata: [DONE]\n\n",
    )
}

/// Handle POST /v1/chat/completions - serves pre-configured mock responses
async fn handle_chat_completions(State(state): State<SharedBackendState>, request: Request<Body>) -> Response {
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let body_bytes = axum::body::to_bytes(request.into_body(), 10 * 1024 * 1024)
        .await
        .unwrap_or_default();
    let body_json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap_or(serde_json::Value::Null);

    let received = ReceivedRequest {
        method: "POST".to_string(),
        path: "/v1/chat/completions".to_string(),
        authorization,
        body: body_json,
    };

    // Pop the next configured response (or use default)
    let mock_response = {
        let mut state = state.lock().unwrap();
        state.received_requests.push(received);
        state.response_queue.pop_front().unwrap_or_else(default_completion_response)
    };

    let body = if mock_response.abort_after_body {
        let head = futures::stream::iter(vec![Ok(Bytes::from(mock_response.body))]);
        let fault = futures::stream::once(async {
            // Give the relay time to forward what it already has
            tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "mock provider reset"))
        });
        Body::from_stream(head.chain(fault))
    } else {
        Body::from(mock_response.body)
    };

    Response::builder()
        .status(mock_response.status)
        .header(header::CONTENT_TYPE, &mock_response.content_type)
        .body(body)
        .unwrap()
        .into_response()
}

/// Handle GET /health
async fn handle_health() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("Content-Type", "application/json")],
        r#"{"status":"ok"}"#,
    )
}

/// Handle GET /v1/models
async fn handle_models() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("Content-Type", "application/json")],
        default_models_response(),
    )
}

/// Start the mock provider server and return the shared state handle
pub async fn start(port: u16) -> anyhow::Result<SharedBackendState> {
    let state: SharedBackendState = std::sync::Arc::new(std::sync::Mutex::new(BackendState::default()));

    let app = Router::new()
        .route("/v1/chat/completions", post(handle_chat_completions))
        .route("/v1/models", get(handle_models))
        .route("/health", get(handle_health))
        .with_state(state.clone());

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind mock provider to {}: {}", addr, e))?;

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Mock provider server failed");
    });

    // Brief pause to let the server start accepting connections
    tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

    Ok(state)
}

/// Helper to configure the next response for /v1/chat/completions
pub fn queue_response(state: &SharedBackendState, response: MockResponse) {
    state.lock().unwrap().response_queue.push_back(response);
}

/// Helper to get all requests received since last clear
pub fn drain_requests(state: &SharedBackendState) -> Vec<ReceivedRequest> {
    let mut s = state.lock().unwrap();
    s.received_requests.drain(..).collect()
}
