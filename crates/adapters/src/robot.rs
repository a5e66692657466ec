// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Adapter for the robot control API.

use async_trait::async_trait;
use er_core::{CommandId, CommandSummary, FailedCommand, HardwareAction, RunId, RunStatus};
use thiserror::Error;

/// Errors from robot API calls
#[derive(Debug, Error)]
pub enum RobotError {
    #[error("connect to {addr} failed: {reason}")]
    Connect { addr: String, reason: String },
    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed response: {0}")]
    Decode(String),
    #[error("{action} failed on the robot: {detail}")]
    CommandFailed { action: HardwareAction, detail: String },
}

impl From<serde_json::Error> for RobotError {
    fn from(e: serde_json::Error) -> Self {
        RobotError::Decode(e.to_string())
    }
}

/// Queries and hardware actions against one robot.
///
/// Every hardware call is fire-and-await: it resolves once the robot has
/// finished (or refused) the action. There is no partial success.
#[async_trait]
pub trait RobotClient: Clone + Send + Sync + 'static {
    /// `GET /runs/{id}`
    async fn run_status(&self, run_id: &RunId) -> Result<RunStatus, RobotError>;

    /// `GET /runs/{id}/commands?pageLength={n}`
    async fn command_summary(
        &self,
        run_id: &RunId,
        page_length: u32,
    ) -> Result<CommandSummary, RobotError>;

    /// `GET /runs/{id}/commands/{commandId}`
    async fn command(
        &self,
        run_id: &RunId,
        command_id: &CommandId,
    ) -> Result<FailedCommand, RobotError>;

    /// Perform a hardware action and wait for it to complete.
    async fn dispatch(&self, run_id: &RunId, action: HardwareAction) -> Result<(), RobotError>;
}
