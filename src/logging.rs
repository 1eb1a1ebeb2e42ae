//! File logging. The terminal belongs to the UI, so tracing output goes to a
//! daily-rolling file under the platform data directory.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the tracing filter directive.
pub const LOG_ENV: &str = "KFS_LOG";

pub fn log_dir() -> PathBuf {
  ProjectDirs::from("", "", "kfs")
    .map(|dirs| dirs.data_local_dir().join("logs"))
    .unwrap_or_else(|| std::env::temp_dir().join("kfs-logs"))
}

/// Install the global subscriber. Keep the guard alive until exit or
/// buffered lines are lost.
pub fn init() -> Result<WorkerGuard> {
  let dir = log_dir();
  std::fs::create_dir_all(&dir).with_context(|| format!("Failed to create log dir {}", dir.display()))?;
  let appender = tracing_appender::rolling::daily(&dir, "kfs.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);

  let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("kfs=info"));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(writer)
    .with_ansi(false)
    .try_init()
    .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))?;
  Ok(guard)
}
