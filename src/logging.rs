//! Logging
//!
//! Installs the global `tracing` subscriber: stdout always, plus a daily
//! rolling file when a log directory is given.

use crate::constants::LOG_FILE_PREFIX;
use crate::error::Result;
use crate::helpers::{get_or_create_data_dir, is_development};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Initialize tracing
///
/// `RUST_LOG` overrides the default level (`debug` in development builds,
/// `info` otherwise). Keep the returned guard alive for as long as file logs
/// should be flushed.
pub fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let default_level = if is_development() { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_ansi(false)
                .with_timer(LocalTime::rfc_3339())
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_timer(LocalTime::rfc_3339()))
        .with(file_layer)
        .try_init();

    match installed {
        Ok(()) => tracing::info!(log_dir = ?log_dir, "Logging initialized"),
        Err(e) => tracing::debug!(error = %e, "Tracing subscriber already installed"),
    }

    guard
}

/// `logs/` under the platform data directory
///
/// Usually resolved before [`init_tracing`], so failures go to the caller.
pub fn default_log_dir() -> Result<PathBuf> {
    Ok(get_or_create_data_dir()?.join("logs"))
}
