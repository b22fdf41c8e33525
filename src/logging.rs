//! File logging setup.
//!
//! The terminal belongs to the UI, so everything goes to a daily rolling file
//! under `$XDG_STATE_HOME/arrivo` (or `~/.local/state/arrivo`).

use std::env;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const LOG_FILE_PREFIX: &str = "arrivo.log";

/// Resolve the log directory from XDG defaults.
pub fn log_dir() -> Option<PathBuf> {
    let state_home = if let Some(xdg) = env::var_os("XDG_STATE_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".local").join("state"))
    };

    state_home.map(|d| d.join("arrivo"))
}

/// Install the global subscriber. Keep the returned guard alive until exit so
/// buffered lines get flushed.
pub fn init() -> Result<Option<WorkerGuard>, Box<dyn std::error::Error>> {
    let Some(dir) = log_dir() else {
        return Ok(None);
    };
    std::fs::create_dir_all(&dir)?;

    let file_appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,arrivo=debug"));

    let subscriber = tracing_subscriber::fmt()
        .with_writer(file_writer)
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .with_env_filter(filter)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(Some(guard))
}
