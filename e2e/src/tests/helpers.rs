//! Common test helpers and SSE builders

use serde_json::{json, Value};

/// System prompt configured in test_configs/relay.yaml
pub const E2E_PROMPT: &str = "You are the e2e test prompt.";

/// Model configured in test_configs/relay.yaml
pub const E2E_MODEL: &str = "e2e-model";

// ─── Request builders ────────────────────────────────────────────────────────

/// Build a one-message conversation
pub fn user_conversation(prompt: &str) -> Value {
    json!([{"role": "user", "content": prompt}])
}

// ─── Provider stream builders ────────────────────────────────────────────────

/// One `data:` frame carrying a content delta
pub fn content_frame(text: &str) -> String {
    let chunk = json!({
        "id": "chatcmpl-e2e",
        "object": "chat.completion.chunk",
        "created": 1700000000,
        "model": E2E_MODEL,
        "choices": [{"index": 0, "delta": {"content": text}, "finish_reason": null}]
    });
    format!("data: {}\n\n", chunk)
}

/// The opening frame that only announces the assistant role
pub fn role_frame() -> String {
    let chunk = json!({
        "id": "chatcmpl-e2e",
        "object": "chat.completion.chunk",
        "model": E2E_MODEL,
        "choices": [{"index": 0, "delta": {"role": "assistant", "content": ""}, "finish_reason": null}]
    });
    format!("data: {}\n\n", chunk)
}

/// The closing frame with a finish reason and empty delta
pub fn finish_frame() -> String {
    let chunk = json!({
        "id": "chatcmpl-e2e",
        "object": "chat.completion.chunk",
        "model": E2E_MODEL,
        "choices": [{"index": 0, "delta": {}, "finish_reason": "stop"}]
    });
    format!("data: {}\n\n", chunk)
}

/// A complete provider stream: role frame, one frame per fragment, finish, `[DONE]`
pub fn provider_stream(fragments: &[&str]) -> String {
    let mut body = role_frame();
    for fragment in fragments {
        body.push_str(&content_frame(fragment));
    }
    body.push_str(&finish_frame());
    body.push_str("data: [DONE]\n\n");
    body
}

/// Content frames only, with no finish and no terminator
pub fn partial_stream(fragments: &[&str]) -> String {
    fragments.iter().map(|f| content_frame(f)).collect()
}

// ─── Assertion helpers ────────────────────────────────────────────────────────

/// Assert two strings are equal, with context on failure
pub fn assert_eq_str(actual: &str, expected: &str, label: &str) -> anyhow::Result<()> {
    if actual != expected {
        Err(anyhow::anyhow!("{label}: expected {:?} but got {:?}", expected, actual))
    } else {
        Ok(())
    }
}

/// Assert condition is true, with message
pub fn assert_true(cond: bool, msg: &str) -> anyhow::Result<()> {
    if !cond {
        Err(anyhow::anyhow!("{}", msg))
    } else {
        Ok(())
    }
}
