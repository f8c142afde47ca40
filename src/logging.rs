//! Tracing setup for the binaries.
//!
//! Logs always go to stderr. When `DASHBOARD_LOG_DIR` is set, a daily rolling
//! `dashboard.log` is written there as well, which is how the unattended Pi
//! install keeps a history. Verbosity follows `RUST_LOG` (default `info`).

use std::path::PathBuf;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable naming the log file directory.
pub const LOG_DIR_ENV: &str = "DASHBOARD_LOG_DIR";

const LOG_FILE_PREFIX: &str = "dashboard.log";

/// Keeps the file writer flushing; hold it until the process exits.
pub struct LogGuard {
    _file_guard: Option<tracing_appender::non_blocking::WorkerGuard>,
}

/// Install the global subscriber. Call once from `main`.
pub fn init() -> LogGuard {
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_guard = if let Some(dir) = std::env::var_os(LOG_DIR_ENV).map(PathBuf::from) {
        let _ = std::fs::create_dir_all(&dir);
        let file_appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

        tracing_subscriber::registry()
            .with(filter())
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(file_layer)
            .init();

        Some(guard)
    } else {
        tracing_subscriber::registry()
            .with(filter())
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();

        None
    };

    LogGuard { _file_guard: file_guard }
}
