// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::error::DaemonError;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Daily-rotated log file name prefix inside the log directory
pub const LOG_FILE_PREFIX: &str = "erd.log";

/// Install the global subscriber: `RUST_LOG` filter (default `info`), a
/// non-blocking daily file in `log_dir`, and stderr.
///
/// The returned guard flushes the file writer on drop; hold it for the life
/// of the process.
pub fn init(log_dir: &Path) -> Result<WorkerGuard, DaemonError> {
    std::fs::create_dir_all(log_dir)?;
    let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(writer).with_ansi(false))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init()
        .map_err(|e| DaemonError::Logging(e.to_string()))?;
    Ok(guard)
}
