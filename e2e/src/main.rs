//! chat-relay e2e test runner
//!
//! Default (no args): spawns the relay binary, runs all tests, kills it.
//!
//!   cargo run                          # auto-detect relay binary, run all tests
//!   cargo run -- list                  # list all tests
//!   cargo run -- run                   # connect to already-running relay
//!   cargo run -- spawn-and-run [opts]  # explicit paths / ports

mod backend;
mod client;
mod runner;
mod tests;
mod types;

use clap::{Parser, Subcommand};
use colored::Colorize;
use runner::{list_tests, run_tests, TestContext};
use tests::all_tests;

/// Default relay binary candidates, tried in order
const DEFAULT_RELAY_BINS: &[&str] = &["../target/release/chat-relay", "../target/debug/chat-relay"];

const DEFAULT_RELAY_CONFIG: &str = "test_configs/relay.yaml";
const DEFAULT_PROVIDER_PORT: u16 = 18080;
const DEFAULT_RELAY_PORT: u16 = 18066;

#[derive(Parser)]
#[command(
    name = "e2e",
    about = "End-to-end tests for chat-relay",
    long_about = "Runs all e2e tests by default (no arguments needed).\n\
                  Spawns the relay binary automatically, runs tests, then kills it."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Only run tests whose name contains this string (applies to default run)
    #[arg(long, short, global = true)]
    filter: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Connect to an already-running relay and run tests
    Run {
        /// Address of the real relay
        #[arg(long, default_value = "127.0.0.1:18066")]
        relay_addr: String,

        /// Port for the mock provider - must match the relay's provider.url
        #[arg(long, default_value_t = DEFAULT_PROVIDER_PORT)]
        provider_port: u16,

        /// Only run tests whose name contains this string
        #[arg(long, short)]
        filter: Option<String>,
    },

    /// List all available tests
    List,

    /// Spawn the relay binary, run all tests, then kill it
    SpawnAndRun {
        /// Path to the chat-relay binary
        #[arg(long)]
        relay_bin: Option<String>,

        /// Path to the relay config YAML (provider must point at mock provider port)
        #[arg(long, default_value = DEFAULT_RELAY_CONFIG)]
        relay_config: String,

        /// Port for the mock provider - must match config
        #[arg(long, default_value_t = DEFAULT_PROVIDER_PORT)]
        provider_port: u16,

        /// Relay listen port - must match config
        #[arg(long, default_value_t = DEFAULT_RELAY_PORT)]
        relay_port: u16,

        /// Only run tests whose name contains this string
        #[arg(long, short)]
        filter: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        // ── No subcommand: default full run ──────────────────────────────────
        None => {
            let relay_bin = find_relay_bin()?;
            do_spawn_and_run(
                relay_bin,
                DEFAULT_RELAY_CONFIG.to_string(),
                DEFAULT_PROVIDER_PORT,
                DEFAULT_RELAY_PORT,
                cli.filter,
            )
            .await?;
        }

        // ── list ─────────────────────────────────────────────────────────────
        Some(Command::List) => {
            list_tests(&all_tests());
        }

        // ── run (connect to existing relay) ───────────────────────────────────
        Some(Command::Run {
            relay_addr,
            provider_port,
            filter,
        }) => {
            let filter = filter.or(cli.filter);
            println!("Starting mock provider on port {}...", provider_port);
            let backend_state = backend::start(provider_port).await?;
            println!("Mock provider running on 127.0.0.1:{}", provider_port);

            let ctx = TestContext {
                relay_addr,
                backend_state,
                http_client: client::build_client(),
            };

            let results = run_tests(all_tests(), ctx, filter.as_deref()).await;
            exit_on_failure(&results);
        }

        // ── spawn-and-run ─────────────────────────────────────────────────────
        Some(Command::SpawnAndRun {
            relay_bin,
            relay_config,
            provider_port,
            relay_port,
            filter,
        }) => {
            let filter = filter.or(cli.filter);
            let relay_bin = match relay_bin {
                Some(p) => p,
                None => find_relay_bin()?,
            };
            do_spawn_and_run(relay_bin, relay_config, provider_port, relay_port, filter).await?;
        }
    }

    Ok(())
}

/// Shared implementation for spawn-and-run (used by both default and explicit subcommand)
async fn do_spawn_and_run(
    relay_bin: String,
    relay_config: String,
    provider_port: u16,
    relay_port: u16,
    filter: Option<String>,
) -> anyhow::Result<()> {
    println!("Starting mock provider on port {}...", provider_port);
    let backend_state = backend::start(provider_port).await?;
    println!("Mock provider running on 127.0.0.1:{}", provider_port);

    println!("Spawning relay: {} run --config {}", relay_bin, relay_config);
    let mut relay_process = tokio::process::Command::new(&relay_bin)
        .arg("run")
        .arg("--config")
        .arg(&relay_config)
        .env_remove("OPENAI_API_KEY")
        .env_remove("OPENAI_BASE_URL")
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| anyhow::anyhow!("Failed to spawn '{}': {}", relay_bin, e))?;

    let relay_addr = format!("127.0.0.1:{}", relay_port);
    println!("Waiting for relay at {}...", relay_addr);
    wait_for_relay(&relay_addr).await?;
    println!("Relay is ready!\n");

    let ctx = TestContext {
        relay_addr,
        backend_state,
        http_client: client::build_client(),
    };

    let results = run_tests(all_tests(), ctx, filter.as_deref()).await;

    relay_process.kill().await.ok();

    exit_on_failure(&results);
    Ok(())
}

/// Find the relay binary, trying release then debug builds
fn find_relay_bin() -> anyhow::Result<String> {
    for candidate in DEFAULT_RELAY_BINS {
        if std::path::Path::new(candidate).exists() {
            println!("Using relay binary: {}", candidate.bright_cyan());
            return Ok(candidate.to_string());
        }
    }
    Err(anyhow::anyhow!(
        "No relay binary found. Tried: {}\nBuild with: cd .. && cargo build --release",
        DEFAULT_RELAY_BINS.join(", ")
    ))
}

/// Exit with code 1 if any tests failed
fn exit_on_failure(results: &[crate::types::TestResult]) {
    let failed = results.iter().filter(|r| !r.passed).count();
    if failed > 0 {
        std::process::exit(1);
    }
}

/// Wait for the relay to start accepting connections (retry with backoff)
async fn wait_for_relay(addr: &str) -> anyhow::Result<()> {
    let client = client::build_client();
    let health_url = format!("http://{}/health", addr);

    for attempt in 0..30 {
        tokio::time::sleep(tokio::time::Duration::from_millis(200 + attempt * 100)).await;
        if client.get(&health_url).send().await.is_ok() {
            return Ok(());
        }
    }

    Err(anyhow::anyhow!(
        "Relay did not start within timeout. Is the binary correct? Check: {}",
        addr
    ))
}
