//! Nostr Gate server entry point.
//!
//! ```text
//! ┌──────────┐    ┌──────────┐    ┌──────────┐    ┌──────────┐
//! │  Config  │───▶│ Registry │───▶│  NIP-98  │───▶│ Gateway  │
//! │  (YAML)  │    │(PG / mem)│    │validator │    │  (axum)  │
//! └──────────┘    └──────────┘    └──────────┘    └──────────┘
//! ```
//!
//! Usage: `nostr_gate [--env <name>] [--port <port>]`

use std::process::ExitCode;
use std::sync::Arc;

use nostr_gate::config::AppConfig;
use nostr_gate::gateway::{run_server, state::AppState};

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

#[tokio::main]
async fn main() -> ExitCode {
    let env = get_env();
    let mut app_config = match AppConfig::load(&env) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("FATAL: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(port) = get_port_override() {
        app_config.gateway.port = port;
    }

    let _log_guard = nostr_gate::logging::init_logging(&app_config);
    tracing::info!(
        "Starting Nostr Gate in {} mode (environment: {})",
        env,
        app_config.environment
    );

    let state = match AppState::from_config(&app_config).await {
        Ok(state) => Arc::new(state),
        Err(e) => {
            tracing::error!("FATAL: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = run_server(&app_config.gateway, state).await {
        tracing::error!("FATAL: Server error: {:#}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
