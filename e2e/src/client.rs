//! HTTP client that talks to the relay the way a chat front-end does

use bytes::Bytes;
use futures::StreamExt;
use reqwest::Client;

use crate::types::RelayResponse;

/// Build an HTTP client
pub fn build_client() -> Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .expect("Failed to build reqwest client")
}

/// POST a conversation to the relay and collect the streamed reply
pub async fn send_chat(client: &Client, relay_addr: &str, conversation: serde_json::Value) -> anyhow::Result<RelayResponse> {
    send_raw(client, relay_addr, conversation.to_string()).await
}

/// POST an arbitrary body to the relay's chat route
///
/// A body that dies mid-stream is not an error here; it is reported in
/// `RelayResponse::stream_error` so tests can assert on truncation.
pub async fn send_raw(client: &Client, relay_addr: &str, body: impl Into<String>) -> anyhow::Result<RelayResponse> {
    let url = format!("http://{relay_addr}/api/chat");

    let resp = client
        .post(&url)
        .header("Content-Type", "application/json")
        .body(body.into())
        .send()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to send request to relay: {}", e))?;

    let status = resp.status().as_u16();
    let content_type = resp
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let mut stream = resp.bytes_stream();
    let mut chunks = Vec::new();
    let mut stream_error = None;

    while let Some(chunk) = stream.next().await {
        match chunk {
            Ok(chunk) => {
                let chunk: Bytes = chunk;
                chunks.push(String::from_utf8_lossy(&chunk).into_owned());
            }
            Err(e) => {
                stream_error = Some(e.to_string());
                break;
            }
        }
    }

    Ok(RelayResponse {
        status,
        content_type,
        chunks,
        stream_error,
    })
}

/// Send a GET request to the relay, returning status and body text
pub async fn send_get(client: &Client, relay_addr: &str, path: &str) -> anyhow::Result<(u16, String)> {
    let url = format!("http://{relay_addr}{path}");

    let resp = client
        .get(&url)
        .send()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to GET {}: {}", url, e))?;

    let status = resp.status().as_u16();
    let body_text = resp.text().await.unwrap_or_default();

    Ok((status, body_text))
}
