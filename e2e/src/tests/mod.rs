//! Test registry - all test cases are registered here

pub mod helpers;

use crate::runner::TestCase;

/// Build and return all test cases
///
/// Tests are grouped by category. Each test:
/// 1. Queues a mock provider stream (what the upstream API would send)
/// 2. Sends a conversation to the REAL relay
/// 3. Validates the relayed body and what the provider received
pub fn all_tests() -> Vec<TestCase> {
    macro_rules! test {
        ($name:expr, $desc:expr, $func:path) => {
            TestCase {
                name: $name,
                description: $desc,
                run: Box::new(|ctx| Box::pin($func(ctx))),
            }
        };
    }

    vec![
        // ── Basic behavior ────────────────────────────────────────────────────
        test!(
            "basic/hello_streams_text",
            "Content fragments are relayed as a raw text body",
            basic::test_hello_streams_text
        ),
        test!(
            "basic/prompt_prepended",
            "Outbound messages are the system prompt followed by the conversation",
            basic::test_prompt_prepended
        ),
        test!(
            "basic/caller_messages_verbatim",
            "Unknown roles and extra message fields are forwarded unchanged",
            basic::test_caller_messages_verbatim
        ),
        test!(
            "basic/outbound_request_shape",
            "Provider receives stream:true, the configured model, and the bearer key",
            basic::test_outbound_request_shape
        ),
        test!(
            "basic/non_content_chunks_skipped",
            "Role-only, empty, and finish chunks add nothing to the body",
            basic::test_non_content_chunks_skipped
        ),
        test!(
            "basic/empty_reply",
            "A stream without content yields an empty 200 body",
            basic::test_empty_reply
        ),
        test!(
            "basic/requests_independent",
            "Repeated identical requests produce identical results",
            basic::test_requests_independent
        ),
        test!("basic/health", "Health endpoint returns OK", basic::test_health),

        // ── Failure paths ─────────────────────────────────────────────────────
        test!(
            "errors/malformed_body",
            "Malformed conversations get a generic 500",
            errors::test_malformed_body
        ),
        test!(
            "errors/provider_rejection",
            "Provider 401 becomes a generic 500",
            errors::test_provider_rejection
        ),
        test!(
            "errors/fault_truncates_body",
            "Provider connection reset aborts the relayed body",
            errors::test_fault_truncates_body
        ),
        test!(
            "errors/error_payload_truncates_body",
            "In-stream error payload aborts the relayed body",
            errors::test_error_payload_truncates_body
        ),
        test!(
            "errors/missing_done_ends_cleanly",
            "Stream without [DONE] still ends the body cleanly",
            errors::test_missing_done_ends_cleanly
        ),
    ]
}
