// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `RobotClient` and `OwnershipSource` over the robot's HTTP API.

use crate::http::{self, HttpResponse};
use crate::ownership::OwnershipSource;
use crate::robot::{RobotClient, RobotError};
use async_trait::async_trait;
use er_core::{
    CommandError, CommandId, CommandLink, CommandSummary, FailedCommand, HardwareAction,
    Ownership, RunId, RunStatus, SessionId, TakeoverIntent,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

/// Client-data key holding the takeover lease.
const OWNERSHIP_PATH: &str = "/robot/clientData/errorRecovery";

/// Axes homed by `home-except-plungers`.
const NON_PLUNGER_AXES: [&str; 6] = ["leftZ", "rightZ", "x", "y", "extensionZ", "extensionJaw"];

#[derive(Debug, Clone)]
pub struct HttpRobotClient {
    addr: String,
    timeout: Duration,
}

impl HttpRobotClient {
    pub fn new(addr: impl Into<String>, timeout: Duration) -> Self {
        Self { addr: addr.into(), timeout }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    async fn send(
        &self,
        method: &str,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<HttpResponse, RobotError> {
        let body = body.map(|b| b.to_string());
        let start = std::time::Instant::now();
        let result = http::request(&self.addr, method, path, body.as_deref(), self.timeout).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(resp) => tracing::debug!(method, path, status = resp.status, elapsed_ms, "robot request"),
            Err(e) => tracing::debug!(method, path, error = %e, elapsed_ms, "robot request failed"),
        }
        result
    }

    async fn get_data<T: DeserializeOwned>(&self, path: &str) -> Result<T, RobotError> {
        let resp = self.send("GET", path, None).await?.error_for_status()?;
        let envelope: Envelope<T> = serde_json::from_str(&resp.body)?;
        Ok(envelope.data)
    }

    async fn run_command(
        &self,
        run_id: &RunId,
        action: HardwareAction,
        command_type: &str,
        params: serde_json::Value,
    ) -> Result<(), RobotError> {
        let path = format!("/runs/{run_id}/commands?waitUntilComplete=true");
        let body = json!({
            "data": { "commandType": command_type, "params": params, "intent": "fixit" }
        });
        let resp = self.send("POST", &path, Some(body)).await?.error_for_status()?;
        let envelope: Envelope<CommandResult> = serde_json::from_str(&resp.body)?;
        let result = envelope.data;
        if result.status == "succeeded" {
            return Ok(());
        }
        let detail = result
            .error
            .map(|e| format!("{}: {}", e.error_type, e.detail))
            .unwrap_or_else(|| format!("command ended with status {}", result.status));
        Err(RobotError::CommandFailed { action, detail })
    }

    async fn run_action(&self, run_id: &RunId, action_type: &str) -> Result<(), RobotError> {
        let path = format!("/runs/{run_id}/actions");
        let body = json!({ "data": { "actionType": action_type } });
        self.send("POST", &path, Some(body)).await?.error_for_status()?;
        Ok(())
    }
}

#[async_trait]
impl RobotClient for HttpRobotClient {
    async fn run_status(&self, run_id: &RunId) -> Result<RunStatus, RobotError> {
        let run: RunData = self.get_data(&format!("/runs/{run_id}")).await?;
        Ok(run.status)
    }

    async fn command_summary(
        &self,
        run_id: &RunId,
        page_length: u32,
    ) -> Result<CommandSummary, RobotError> {
        let path = format!("/runs/{run_id}/commands?pageLength={page_length}");
        let resp = self.send("GET", &path, None).await?.error_for_status()?;
        let page: CommandsPage = serde_json::from_str(&resp.body)?;
        Ok(CommandSummary {
            currently_recovering_from: page.links.currently_recovering_from.map(|l| l.meta),
        })
    }

    async fn command(
        &self,
        run_id: &RunId,
        command_id: &CommandId,
    ) -> Result<FailedCommand, RobotError> {
        self.get_data(&format!("/runs/{run_id}/commands/{command_id}")).await
    }

    async fn dispatch(&self, run_id: &RunId, action: HardwareAction) -> Result<(), RobotError> {
        match action {
            HardwareAction::ReleaseGripperJaws => {
                self.run_command(run_id, action, "unsafe/ungripLabware", json!({})).await
            }
            HardwareAction::HomeExceptPlungers => {
                self.run_command(run_id, action, "home", json!({ "axes": NON_PLUNGER_AXES }))
                    .await
            }
            HardwareAction::ResumeFromRecovery => {
                self.run_action(run_id, "resume-from-recovery").await
            }
            HardwareAction::StopRun => self.run_action(run_id, "stop").await,
        }
    }
}

#[async_trait]
impl OwnershipSource for HttpRobotClient {
    async fn current_owner(&self, run_id: &RunId) -> Result<Option<Ownership>, RobotError> {
        let resp = self.send("GET", OWNERSHIP_PATH, None).await?;
        if resp.status == 404 {
            return Ok(None);
        }
        let resp = resp.error_for_status()?;
        let envelope: Envelope<Option<LeaseRecord>> = serde_json::from_str(&resp.body)?;
        Ok(envelope.data.filter(|r| &r.run_id == run_id).map(LeaseRecord::into_ownership))
    }

    async fn claim(
        &self,
        run_id: &RunId,
        ownership: Ownership,
    ) -> Result<Option<Ownership>, RobotError> {
        // read-then-write: the client data store has no compare-and-swap
        let previous = self.current_owner(run_id).await?;
        let record = LeaseRecord {
            run_id: run_id.clone(),
            session_id: ownership.session_id,
            intent: ownership.intent,
        };
        self.send("PUT", OWNERSHIP_PATH, Some(json!({ "data": record })))
            .await?
            .error_for_status()?;
        Ok(previous)
    }

    async fn release(&self, run_id: &RunId, session_id: &SessionId) -> Result<(), RobotError> {
        let holds = self
            .current_owner(run_id)
            .await?
            .is_some_and(|o| &o.session_id == session_id);
        if holds {
            let resp = self.send("DELETE", OWNERSHIP_PATH, None).await?;
            if resp.status != 404 {
                resp.error_for_status()?;
            }
        }
        Ok(())
    }
}

// Wire envelopes

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct RunData {
    status: RunStatus,
}

#[derive(Deserialize)]
struct CommandsPage {
    #[serde(default)]
    links: PageLinks,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageLinks {
    #[serde(default)]
    currently_recovering_from: Option<LinkRef>,
}

#[derive(Deserialize)]
struct LinkRef {
    meta: CommandLink,
}

#[derive(Deserialize)]
struct CommandResult {
    status: String,
    #[serde(default)]
    error: Option<CommandError>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LeaseRecord {
    run_id: RunId,
    session_id: SessionId,
    intent: TakeoverIntent,
}

impl LeaseRecord {
    fn into_ownership(self) -> Ownership {
        Ownership { session_id: self.session_id, intent: self.intent }
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
