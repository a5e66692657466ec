// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Watch a single run until shutdown.

use crate::env::DaemonConfig;
use crate::error::DaemonError;
use er_adapters::{HttpRobotClient, OwnershipSource, RobotClient};
use er_core::{RunId, SessionEvent, SessionId};
use er_engine::{ControllerDeps, EngineConfig, RecoveryController};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

const INPUT_BUFFER: usize = 64;

/// Time allowed for the event logger to drain after the controller stops.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Watch the configured run over HTTP.
pub async fn watch(config: &DaemonConfig, shutdown: CancellationToken) -> Result<(), DaemonError> {
    let robot = HttpRobotClient::new(config.robot_addr.clone(), config.http_timeout);
    tracing::info!(addr = robot.addr(), "connecting to robot");
    run_session(robot.clone(), robot, config.run_id.clone(), config.engine.clone(), shutdown).await
}

/// Drive one recovery session until `shutdown` fires.
///
/// The run must be reachable at startup; later poll failures are transient
/// and only logged.
pub async fn run_session<R, O>(
    robot: R,
    ownership: O,
    run_id: RunId,
    engine: EngineConfig,
    shutdown: CancellationToken,
) -> Result<(), DaemonError>
where
    R: RobotClient,
    O: OwnershipSource,
{
    let status = robot.run_status(&run_id).await?;
    let session_id = SessionId::generate();
    tracing::info!(%run_id, session = %session_id, %status, "watching run");

    let (input_tx, inputs) = mpsc::channel(INPUT_BUFFER);
    let (event_tx, events) = mpsc::unbounded_channel();
    let controller = RecoveryController::new(
        run_id,
        session_id,
        ControllerDeps { robot, ownership },
        engine,
        input_tx,
        event_tx,
    );
    // The daemon has no labware context to load; a reachable run is enough.
    controller.set_context_loaded(true);

    let logger = tokio::spawn(log_events(events));
    let pollers = controller.spawn_pollers(shutdown.clone());
    controller.run(inputs, shutdown).await;

    for poller in pollers {
        if let Err(e) = poller.await {
            tracing::warn!(error = %e, "poller task failed");
        }
    }
    if tokio::time::timeout(DRAIN_TIMEOUT, logger).await.is_err() {
        tracing::debug!("event logger still draining at shutdown");
    }
    Ok(())
}

async fn log_events(mut events: mpsc::UnboundedReceiver<SessionEvent>) {
    while let Some(event) = events.recv().await {
        match serde_json::to_string(&event) {
            Ok(json) => tracing::info!(event = %event, %json, "session event"),
            Err(e) => tracing::warn!(event = %event, error = %e, "unserializable session event"),
        }
    }
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;
