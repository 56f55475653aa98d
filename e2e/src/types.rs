//! Shared types for the e2e test framework

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// A mock response the provider will serve for the next request to /v1/chat/completions
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub body: String,
    pub content_type: String,
    /// Reset the connection after writing `body` instead of ending it cleanly
    pub abort_after_body: bool,
}

impl MockResponse {
    /// Create a streaming SSE response
    pub fn sse(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
            content_type: "text/event-stream".to_string(),
            abort_after_body: false,
        }
    }

    /// Create an SSE response whose connection dies after `body`
    pub fn sse_then_abort(body: impl Into<String>) -> Self {
        Self {
            abort_after_body: true,
            ..Self::sse(body)
        }
    }

    /// Create an error response
    pub fn error(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            content_type: "application/json".to_string(),
            abort_after_body: false,
        }
    }
}

/// Shared state for the mock provider server
#[derive(Debug, Default)]
pub struct BackendState {
    /// Queue of responses to serve - tests push responses, the provider pops and serves them
    pub response_queue: VecDeque<MockResponse>,
    /// All requests received by the provider (for inspection)
    pub received_requests: Vec<ReceivedRequest>,
}

/// A request received by the mock provider
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct ReceivedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub body: serde_json::Value,
}

impl ReceivedRequest {
    /// `(role, content)` pairs of the outbound message list
    pub fn messages(&self) -> Vec<(String, String)> {
        self.body
            .get("messages")
            .and_then(|v| v.as_array())
            .map(|messages| {
                messages
                    .iter()
                    .map(|m| {
                        let field = |name: &str| m.get(name).and_then(|v| v.as_str()).unwrap_or("").to_string();
                        (field("role"), field("content"))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

pub type SharedBackendState = Arc<Mutex<BackendState>>;

/// Result of one request to the relay
#[derive(Debug)]
pub struct RelayResponse {
    pub status: u16,
    pub content_type: String,
    /// Raw body chunks as they arrived on the wire
    pub chunks: Vec<String>,
    /// Set when the body ended with a transport error instead of a clean end
    pub stream_error: Option<String>,
}

impl RelayResponse {
    /// Full body text received before the stream ended
    pub fn text(&self) -> String {
        self.chunks.concat()
    }

    pub fn completed(&self) -> bool {
        self.stream_error.is_none()
    }
}

/// Result of a single test case
#[derive(Debug)]
#[allow(dead_code)]
pub struct TestResult {
    pub name: String,
    pub passed: bool,
    pub error: Option<String>,
    pub duration_ms: u64,
}
