//! Log setup: stderr for the console, plus one file per day.

use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Daily file named `matrix.YYYY-MM-DD.log` in `dir`.
pub fn daily_log_file(dir: &Path) -> Result<RollingFileAppender> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("matrix")
        .filename_suffix("log")
        .build(dir)
        .context("Failed to open log file")
}

/// Precedence: `--log-level`, then `RUST_LOG`, then the config file.
///
/// The returned guard flushes the log file when dropped, so keep it alive
/// for the whole run.
pub fn init(cli_level: Option<&str>, config_level: &str, log_dir: &Path) -> Option<WorkerGuard> {
    let filter = match cli_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config_level)),
    };

    let (file_layer, guard, file_error) = match daily_log_file(log_dir) {
        Ok(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard), None)
        }
        Err(e) => (None, None, Some(e)),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    if let Some(e) = file_error {
        tracing::warn!("Logging to stderr only: {:#}", e);
    }
    guard
}
