//! File-only logging for TUI mode.
//!
//! While ratatui owns the terminal in raw/alternate-screen mode, nothing
//! may write to stdout. All logs therefore go to a daily-rolling JSON file
//! in the platform data directory; standard `log` macros are bridged to
//! `tracing` so call sites stay on `log::info!` and friends.

use std::fs;
use std::io;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Directory that receives the rolling log files.
fn log_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("audit-assistant").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

/// Initialize the logging system for TUI mode.
///
/// Returns a `WorkerGuard` which must be kept alive for the duration of
/// the application so buffered logs are flushed on shutdown.
pub fn init_tui() -> io::Result<WorkerGuard> {
    let log_dir = log_dir();
    if !log_dir.exists() {
        fs::create_dir_all(&log_dir)?;
    }

    let file_appender = tracing_appender::rolling::daily(&log_dir, "audit-assistant.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // JSON format for easy parsing; no stdout layer - the TUI owns the terminal
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .json()
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .with_filter(env_filter);

    tracing_subscriber::registry().with(file_layer).init();

    if let Err(e) = tracing_log::LogTracer::init() {
        eprintln!("Failed to initialize LogTracer: {e}");
    }

    log::info!(
        "Logging initialized. Writing to: {:?} (daily rolling)",
        log_dir.join("audit-assistant.log")
    );

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_dir_is_absolute_or_fallback() {
        let dir = log_dir();
        assert!(dir.is_absolute() || dir == PathBuf::from("logs"));
    }

    #[test]
    fn test_log_dir_under_app_namespace() {
        let dir = log_dir();
        let s = dir.to_string_lossy();
        assert!(s.contains("audit-assistant") || s.ends_with("logs"));
    }
}
