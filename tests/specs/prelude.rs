// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared harness for recovery specs.

pub use er_adapters::{failed_command, FakeOwnership, FakeRobotClient, RobotCall};
pub use er_core::{
    HardwareAction, RecipeKind, RecoveryRoute, RecoveryStep, RoutePosition, RunId, RunStatus,
    SessionEvent, SessionId, SessionSnapshot, TakeoverIntent,
};
pub use er_engine::{ControllerDeps, EngineConfig, Input, RecoveryController, RecoveryError};
pub use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

pub const RUN: &str = "run-1";

/// One client session against a shared fake robot and lease board.
pub struct Session {
    pub robot: FakeRobotClient,
    pub board: FakeOwnership,
    pub controller: RecoveryController<FakeRobotClient, FakeOwnership>,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    shutdown: CancellationToken,
}

impl Session {
    /// Fresh robot whose run failed on a `moveLabware` command.
    pub fn solo() -> Self {
        let robot = FakeRobotClient::new();
        robot.set_failed_command(failed_command("cmd-1", "moveLabware"));
        Self::join(robot, FakeOwnership::new(), "ses-a")
    }

    /// Another client of the same robot.
    pub fn peer(&self, session: &str) -> Self {
        Self::join(self.robot.clone(), self.board.clone(), session)
    }

    pub fn join(robot: FakeRobotClient, board: FakeOwnership, session: &str) -> Self {
        let (input_tx, inputs) = mpsc::channel(64);
        let (event_tx, events) = mpsc::unbounded_channel();
        let controller = RecoveryController::new(
            RunId::new(RUN),
            SessionId::new(session),
            ControllerDeps { robot: robot.clone(), ownership: board.clone() },
            EngineConfig::default(),
            input_tx,
            event_tx,
        );
        let shutdown = CancellationToken::new();
        tokio::spawn(controller.clone().run(inputs, shutdown.clone()));
        Self { robot, board, controller, events, shutdown }
    }

    pub async fn status(&self, status: RunStatus) {
        self.robot.set_status(status);
        self.controller.handle(Input::RunStatus(status)).await;
        settle().await;
    }

    /// Run enters recovery and this session opens the recovery UI.
    pub async fn open(&self) {
        self.enter().await;
        self.controller.toggle_recovery(true).await.unwrap();
    }

    /// Run enters recovery with context loaded, without claiming the lease.
    pub async fn enter(&self) {
        self.status(RunStatus::AwaitingRecovery).await;
        self.controller.set_context_loaded(true);
    }

    /// Observe the lease board as the heartbeat would.
    pub async fn heartbeat(&self) {
        let lease = self.controller.read_lease().await.unwrap();
        self.controller.handle(lease).await;
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.controller.snapshot()
    }

    pub fn position(&self) -> RoutePosition {
        let snap = self.snapshot();
        RoutePosition { route: snap.current_route, step: snap.current_step }
    }

    pub fn events(&mut self) -> Vec<SessionEvent> {
        let mut out = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            out.push(event);
        }
        out
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}

pub async fn advance(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

pub fn at(route: RecoveryRoute, step: RecoveryStep) -> RoutePosition {
    RoutePosition { route, step }
}
