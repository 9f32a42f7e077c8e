//! Gate logging.
//!
//! Each NIP-98 rule logs its own details at `warn`, then the validator logs
//! the `AuthErrorCode` name (`URL_MISMATCH`, `STALE_TIMESTAMP`, ...), and
//! every development-mode bypass is logged at `warn` with a `DEVMODE:` prefix,
//! so `warn` is the useful production level. Targets stay on in the file
//! output so a rejection can be traced to the rule that raised it.
//!
//! `RUST_LOG` overrides `log_level` entirely.

use crate::config::AppConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn rotation(name: &str) -> Rotation {
    match name {
        "hourly" => Rotation::HOURLY,
        "daily" => Rotation::DAILY,
        _ => Rotation::NEVER,
    }
}

/// Service level plus quiet dependencies: sqlx logs every statement at
/// info, hyper connection chatter at debug.
fn default_filter(config: &AppConfig) -> String {
    format!("{},sqlx=warn,hyper=warn", config.log_level)
}

/// Install the global subscriber. Keep the guard alive for the process
/// lifetime or buffered file output is lost.
pub fn init_logging(config: &AppConfig) -> WorkerGuard {
    let file_appender = RollingFileAppender::new(
        rotation(&config.rotation),
        &config.log_dir,
        &config.log_file,
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(config)));

    let registry = tracing_subscriber::registry().with(filter);

    if config.use_json {
        let file_layer = fmt::layer()
            .json()
            .with_target(true)
            .with_writer(non_blocking)
            .with_ansi(false);
        registry.with(file_layer).init();
    } else {
        let file_layer = fmt::layer()
            .with_target(true)
            .with_writer(non_blocking)
            .with_ansi(false);
        // Console is for operators watching the gate; the file keeps targets
        let stdout_layer = fmt::layer().with_target(false).with_ansi(true);
        registry.with(file_layer).with(stdout_layer).init();
    }

    guard
}
