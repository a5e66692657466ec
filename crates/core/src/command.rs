// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Commands a run can be blocked on.

use crate::id::{CommandId, RunId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Robot timestamps are UTC.
pub type Timestamp = DateTime<Utc>;

/// Pointer to the command a run is currently recovering from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandLink {
    pub run_id: RunId,
    pub command_id: CommandId,
}

/// Lightweight page of the run's command list. Only the link matters here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandSummary {
    #[serde(default)]
    pub currently_recovering_from: Option<CommandLink>,
}

/// Error attached to a failed command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
    pub error_type: String,
    #[serde(default)]
    pub detail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

/// The command record a run is blocked on.
///
/// Only ever handed out whole: the monitor assembles it from the summary
/// link and the detail fetch, and publishes nothing until both are in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedCommand {
    pub id: CommandId,
    /// Reference to the protocol command this run command was created from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub command_type: String,
    pub created_at: Timestamp,
    #[serde(default)]
    pub params: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<CommandError>,
}

impl FailedCommand {
    /// Error type reported by the robot, or `""` when the command carries none.
    pub fn error_type(&self) -> &str {
        self.error.as_ref().map(|e| e.error_type.as_str()).unwrap_or("")
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
