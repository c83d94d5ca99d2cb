// logging.rs

use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE: &str = "shell.log";

/// Keeps the background log writer alive; logs are flushed when dropped.
pub struct LogGuard {
    _guard: WorkerGuard,
}

/// Sends all `tracing` output to `<log_dir>/shell.log`. The terminal stays clean.
pub fn init(log_dir: &Path, directive: &str) -> Result<LogGuard> {
    let appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_new(directive).with_context(|| format!("invalid log filter `{}`", directive))?;

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()
        .context("logging already initialized")?;

    Ok(LogGuard { _guard: guard })
}
