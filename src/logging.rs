//! Log routing for the `docsum` server and CLI.
//!
//! The server writes compact lines to stdout and mirrors them, with targets, into a log file:
//! `DOCSUM_LOG_FILE` when set, `logs/docsum.log` otherwise. Pipeline stages, upload staging and
//! artifact cleanup all log through `tracing`, so one `RUST_LOG` filter covers every request.
//! The CLI keeps stdout for command output and logs to stderr only.
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const LOG_FILE_VARIABLE: &str = "DOCSUM_LOG_FILE";
const DEFAULT_LOG_FILE: &str = "logs/docsum.log";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Install the server's stdout and file subscribers, filtered by `RUST_LOG` (default `info`).
///
/// When the log file cannot be opened the server still starts with stdout logging alone.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = fmt::layer().with_target(false).compact();

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer);

    if let Some(writer) = configure_file_writer() {
        let file_layer = fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_ansi(false)
            .compact();

        registry.with(file_layer).init();
    } else {
        registry.init();
    }
}

/// Configure stderr-only tracing for the command-line tool.
///
/// Stdout carries the command's output, so log lines go to stderr and default to `warn`.
pub fn init_cli_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}

fn log_file_path(configured: Option<String>) -> PathBuf {
    configured
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE))
}

/// Open the log file for appending behind a non-blocking writer.
///
/// The writer's guard lives in [`LOG_GUARD`] so buffered lines are flushed until exit.
fn configure_file_writer() -> Option<NonBlocking> {
    let path = log_file_path(std::env::var(LOG_FILE_VARIABLE).ok());
    let file = match open_log_file(&path) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("Failed to open log file {}: {err}", path.display());
            return None;
        }
    };
    let (non_blocking, guard) = tracing_appender::non_blocking(file);
    let _ = LOG_GUARD.set(guard);
    Some(non_blocking)
}

fn open_log_file(path: &Path) -> std::io::Result<std::fs::File> {
    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
