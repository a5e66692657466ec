// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory fakes for tests.

use crate::ownership::OwnershipSource;
use crate::robot::{RobotClient, RobotError};
use async_trait::async_trait;
use er_core::command::Timestamp;
use er_core::{
    CommandId, CommandLink, CommandSummary, FailedCommand, HardwareAction, Ownership, RunId,
    RunStatus, SessionId,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Recorded robot call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RobotCall {
    RunStatus(RunId),
    CommandSummary(RunId),
    Command(CommandId),
    Dispatch(HardwareAction),
}

struct FakeRobotState {
    status: RunStatus,
    recovering_from: Option<CommandId>,
    commands: HashMap<CommandId, FailedCommand>,
    calls: Vec<RobotCall>,
    fail_queries: bool,
    fail_actions: HashMap<HardwareAction, String>,
    hold_dispatch: Option<Arc<Semaphore>>,
    hold_detail: Option<Arc<Semaphore>>,
}

/// Fake robot with a settable run, recorded calls, and calls that can be
/// held open until the test releases them.
#[derive(Clone)]
pub struct FakeRobotClient {
    inner: Arc<Mutex<FakeRobotState>>,
}

impl Default for FakeRobotClient {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeRobotState {
                status: RunStatus::Running,
                recovering_from: None,
                commands: HashMap::new(),
                calls: Vec::new(),
                fail_queries: false,
                fail_actions: HashMap::new(),
                hold_dispatch: None,
                hold_detail: None,
            })),
        }
    }
}

impl FakeRobotClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(&self, status: RunStatus) {
        self.inner.lock().status = status;
    }

    /// Make `command` the one the run is recovering from.
    pub fn set_failed_command(&self, command: FailedCommand) {
        let mut inner = self.inner.lock();
        inner.recovering_from = Some(command.id.clone());
        inner.commands.insert(command.id.clone(), command);
    }

    pub fn clear_failed_command(&self) {
        self.inner.lock().recovering_from = None;
    }

    /// Make every query fail with a connect error until turned off.
    pub fn fail_queries(&self, fail: bool) {
        self.inner.lock().fail_queries = fail;
    }

    /// Make `action` fail with `detail` on the robot.
    pub fn fail_action(&self, action: HardwareAction, detail: impl Into<String>) {
        self.inner.lock().fail_actions.insert(action, detail.into());
    }

    /// Hold every later `dispatch` open until [`Self::release_dispatch`].
    pub fn hold_dispatch(&self) {
        self.inner.lock().hold_dispatch = Some(Arc::new(Semaphore::new(0)));
    }

    /// Let `n` held dispatches complete.
    pub fn release_dispatch(&self, n: usize) {
        if let Some(sem) = &self.inner.lock().hold_dispatch {
            sem.add_permits(n);
        }
    }

    /// Hold every later command detail fetch open until [`Self::release_detail`].
    pub fn hold_detail(&self) {
        self.inner.lock().hold_detail = Some(Arc::new(Semaphore::new(0)));
    }

    pub fn release_detail(&self, n: usize) {
        if let Some(sem) = &self.inner.lock().hold_detail {
            sem.add_permits(n);
        }
    }

    pub fn calls(&self) -> Vec<RobotCall> {
        self.inner.lock().calls.clone()
    }

    /// Hardware actions in dispatch order
    pub fn dispatched(&self) -> Vec<HardwareAction> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                RobotCall::Dispatch(a) => Some(a),
                _ => None,
            })
            .collect()
    }

    pub fn query_count(&self) -> usize {
        self.calls().iter().filter(|c| !matches!(c, RobotCall::Dispatch(_))).count()
    }

    fn record(&self, call: RobotCall) -> Result<(), RobotError> {
        let mut inner = self.inner.lock();
        let is_query = !matches!(call, RobotCall::Dispatch(_));
        inner.calls.push(call);
        if is_query && inner.fail_queries {
            return Err(RobotError::Connect { addr: "fake".into(), reason: "refused".into() });
        }
        Ok(())
    }
}

async fn wait_on(hold: Option<Arc<Semaphore>>) {
    if let Some(sem) = hold {
        if let Ok(permit) = sem.acquire().await {
            permit.forget();
        }
    }
}

#[async_trait]
impl RobotClient for FakeRobotClient {
    async fn run_status(&self, run_id: &RunId) -> Result<RunStatus, RobotError> {
        self.record(RobotCall::RunStatus(run_id.clone()))?;
        Ok(self.inner.lock().status)
    }

    async fn command_summary(
        &self,
        run_id: &RunId,
        _page_length: u32,
    ) -> Result<CommandSummary, RobotError> {
        self.record(RobotCall::CommandSummary(run_id.clone()))?;
        let inner = self.inner.lock();
        Ok(CommandSummary {
            currently_recovering_from: inner
                .recovering_from
                .clone()
                .map(|command_id| CommandLink { run_id: run_id.clone(), command_id }),
        })
    }

    async fn command(
        &self,
        _run_id: &RunId,
        command_id: &CommandId,
    ) -> Result<FailedCommand, RobotError> {
        self.record(RobotCall::Command(command_id.clone()))?;
        let hold = self.inner.lock().hold_detail.clone();
        wait_on(hold).await;
        self.inner
            .lock()
            .commands
            .get(command_id)
            .cloned()
            .ok_or_else(|| RobotError::Status { status: 404, body: command_id.to_string() })
    }

    async fn dispatch(&self, _run_id: &RunId, action: HardwareAction) -> Result<(), RobotError> {
        self.record(RobotCall::Dispatch(action))?;
        let hold = self.inner.lock().hold_dispatch.clone();
        wait_on(hold).await;
        match self.inner.lock().fail_actions.get(&action) {
            Some(detail) => Err(RobotError::CommandFailed { action, detail: detail.clone() }),
            None => Ok(()),
        }
    }
}

/// Shared in-memory lease board. Clones see the same records, so several
/// sessions built from clones behave like clients of one robot.
#[derive(Clone, Default)]
pub struct FakeOwnership {
    inner: Arc<Mutex<HashMap<RunId, Ownership>>>,
}

impl FakeOwnership {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn owner(&self, run_id: &RunId) -> Option<Ownership> {
        self.inner.lock().get(run_id).cloned()
    }

    pub fn set_owner(&self, run_id: &RunId, ownership: Option<Ownership>) {
        let mut inner = self.inner.lock();
        match ownership {
            Some(o) => inner.insert(run_id.clone(), o),
            None => inner.remove(run_id),
        };
    }
}

#[async_trait]
impl OwnershipSource for FakeOwnership {
    async fn current_owner(&self, run_id: &RunId) -> Result<Option<Ownership>, RobotError> {
        Ok(self.owner(run_id))
    }

    async fn claim(
        &self,
        run_id: &RunId,
        ownership: Ownership,
    ) -> Result<Option<Ownership>, RobotError> {
        Ok(self.inner.lock().insert(run_id.clone(), ownership))
    }

    async fn release(&self, run_id: &RunId, session_id: &SessionId) -> Result<(), RobotError> {
        let mut inner = self.inner.lock();
        if inner.get(run_id).is_some_and(|o| &o.session_id == session_id) {
            inner.remove(run_id);
        }
        Ok(())
    }
}

/// Failed command with test defaults.
pub fn failed_command(id: &str, command_type: &str) -> FailedCommand {
    FailedCommand {
        id: CommandId::new(id),
        key: Some(format!("key-{id}")),
        command_type: command_type.to_string(),
        created_at: Timestamp::default(),
        params: serde_json::json!({}),
        error: None,
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
