//! Test runner - executes tests against the relay and reports results

use colored::Colorize;
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::time::Instant;

use crate::types::{SharedBackendState, TestResult};

type TestFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;

/// A single test case
pub struct TestCase {
    pub name: &'static str,
    pub description: &'static str,
    pub run: Box<dyn Fn(TestContext) -> TestFuture + Send + Sync>,
}

impl TestCase {
    /// Category prefix of the test name ("basic/health" -> "basic")
    fn category(&self) -> &'static str {
        self.name.split('/').next().unwrap_or(self.name)
    }
}

/// Context passed to each test - relay address and mock provider state
#[derive(Clone)]
pub struct TestContext {
    pub relay_addr: String,
    pub backend_state: SharedBackendState,
    pub http_client: reqwest::Client,
}

/// Clear queued provider responses and recorded requests
fn reset_provider(state: &SharedBackendState) {
    let mut state = state.lock().unwrap();
    state.response_queue.clear();
    state.received_requests.clear();
}

/// Fail a passing test that queued provider responses the relay never asked for
fn check_queue_consumed(state: &SharedBackendState) -> anyhow::Result<()> {
    let left = state.lock().unwrap().response_queue.len();
    if left > 0 {
        return Err(anyhow::anyhow!(
            "{} queued provider response(s) were never requested by the relay",
            left
        ));
    }
    Ok(())
}

/// Run all provided test cases sequentially and report results
pub async fn run_tests(cases: Vec<TestCase>, ctx: TestContext, filter: Option<&str>) -> Vec<TestResult> {
    println!("\n{}", "═══════════════════════════════════════════════════".bright_blue());
    println!("{}", "  chat-relay End-to-End Tests".bright_white().bold());
    println!("{}", "═══════════════════════════════════════════════════".bright_blue());
    println!("  Relay:   {}", ctx.relay_addr.bright_cyan());

    let selected: Vec<&TestCase> = cases
        .iter()
        .filter(|c| filter.map_or(true, |f| c.name.contains(f)))
        .collect();

    println!("  Running: {} test(s)\n", selected.len().to_string().bright_cyan());

    let mut results = Vec::with_capacity(selected.len());
    // category -> (passed, failed)
    let mut by_category: BTreeMap<&str, (usize, usize)> = BTreeMap::new();

    for case in selected {
        reset_provider(&ctx.backend_state);

        let start = Instant::now();
        print!("  {} {} ... ", "▶".bright_blue(), case.name.bright_white());

        let outcome = match (case.run)(ctx.clone()).await {
            Ok(()) => check_queue_consumed(&ctx.backend_state),
            Err(e) => Err(e),
        };
        let duration_ms = start.elapsed().as_millis() as u64;

        let tally = by_category.entry(case.category()).or_default();
        let error = match outcome {
            Ok(()) => {
                println!("{} ({duration_ms}ms)", "PASS".bright_green().bold());
                tally.0 += 1;
                None
            }
            Err(e) => {
                println!("{} ({duration_ms}ms)", "FAIL".bright_red().bold());
                println!("    {} {}", "Error:".bright_red(), e);
                for cause in e.chain().skip(1) {
                    println!("    {} {}", "Caused by:".yellow(), cause);
                }
                tally.1 += 1;
                Some(e.to_string())
            }
        };

        results.push(TestResult {
            name: case.name.to_string(),
            passed: error.is_none(),
            error,
            duration_ms,
        });
    }

    print_summary(&results, &by_category);
    results
}

fn print_summary(results: &[TestResult], by_category: &BTreeMap<&str, (usize, usize)>) {
    println!("\n{}", "───────────────────────────────────────────────────".bright_blue());
    for (category, (passed, failed)) in by_category {
        println!("  {:<10} {} passed, {} failed", category, passed, failed);
    }

    let failures: Vec<&TestResult> = results.iter().filter(|r| !r.passed).collect();
    for failure in &failures {
        println!("  {} {}", "✗".bright_red(), failure.name);
    }

    let passed = results.len() - failures.len();
    let summary = format!("  Results: {} passed, {} failed", passed, failures.len());
    if failures.is_empty() {
        println!("{}", summary.bright_green().bold());
    } else {
        println!("{}", summary.bright_red().bold());
    }
    println!("{}\n", "═══════════════════════════════════════════════════".bright_blue());
}

/// Helper to list all available tests
pub fn list_tests(cases: &[TestCase]) {
    println!("\n{}", "Available tests:".bright_white().bold());
    for case in cases {
        println!("  {} - {}", case.name.bright_cyan(), case.description);
    }
    println!();
}
