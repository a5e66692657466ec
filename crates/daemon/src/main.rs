// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! erd: watches one robot run and drives its error recovery session.

use er_daemon::{logging, watch, DaemonConfig, DaemonError};
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("erd: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), DaemonError> {
    let config = DaemonConfig::from_env()?;
    let _guard = logging::init(&config.log_dir)?;
    tracing::info!(run_id = %config.run_id, log_dir = %config.log_dir.display(), "erd starting");

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("shutdown requested");
                signal.cancel();
            }
            Err(e) => tracing::warn!(error = %e, "could not listen for ctrl-c"),
        }
    });

    watch(&config, shutdown).await?;
    tracing::info!("erd stopped");
    Ok(())
}
