// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recovery status monitor
//!
//! While the run status is recovery-eligible, polls the command summary
//! for the `currentlyRecoveringFrom` link and then fetches that command's
//! detail. The failed command is reported only after the first complete
//! lookup of an episode. Each entry into an eligible status starts a new
//! episode; lookups that finish after their episode ended are discarded.

use crate::input::Input;
use crate::ticker::spawn_ticker;
use er_adapters::{RobotClient, RobotError};
use er_core::{CommandId, FailedCommand, RunId, RunStatus};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

#[derive(Default)]
struct MonitorState {
    episode: u64,
    polling: Option<CancellationToken>,
    ready: bool,
    current: Option<FailedCommand>,
    /// Command details fetched this episode. A failed command does not
    /// change once reported, so the detail is fetched once per id.
    details: HashMap<CommandId, FailedCommand>,
}

#[derive(Clone)]
pub struct RecoveryStatusMonitor<R: RobotClient> {
    robot: R,
    run_id: RunId,
    poll_interval: Duration,
    page_length: u32,
    input_tx: mpsc::Sender<Input>,
    state: Arc<Mutex<MonitorState>>,
}

impl<R: RobotClient> RecoveryStatusMonitor<R> {
    pub fn new(
        robot: R,
        run_id: RunId,
        poll_interval: Duration,
        page_length: u32,
        input_tx: mpsc::Sender<Input>,
    ) -> Self {
        Self {
            robot,
            run_id,
            poll_interval,
            page_length,
            input_tx,
            state: Arc::new(Mutex::new(MonitorState::default())),
        }
    }

    /// Fold in the latest run status, starting or stopping the poller.
    pub fn observe(&self, status: RunStatus) {
        let eligible = status.is_recovery_eligible();
        let mut st = self.state.lock();
        match (eligible, st.polling.is_some()) {
            (true, false) => {
                st.episode += 1;
                st.ready = false;
                st.current = None;
                st.details.clear();
                let token = CancellationToken::new();
                st.polling = Some(token.clone());
                let episode = st.episode;
                drop(st);
                tracing::info!(run_id = %self.run_id, episode, %status, "recovery monitor started");
                self.spawn_poller(episode, token);
            }
            (false, true) => {
                if let Some(token) = st.polling.take() {
                    token.cancel();
                }
                // Anything still in flight belongs to a finished episode.
                st.episode += 1;
                st.ready = false;
                st.current = None;
                tracing::info!(run_id = %self.run_id, %status, "recovery monitor stopped");
            }
            _ => {}
        }
    }

    /// The failed command, or `None` until the first lookup of the current
    /// episode has completed.
    pub fn current(&self) -> Option<FailedCommand> {
        let st = self.state.lock();
        if st.ready {
            st.current.clone()
        } else {
            None
        }
    }

    pub fn is_polling(&self) -> bool {
        self.state.lock().polling.is_some()
    }

    /// Generation of the current episode.
    pub fn episode(&self) -> u64 {
        self.state.lock().episode
    }

    /// Stop polling without ending the episode bookkeeping.
    pub fn shutdown(&self) {
        if let Some(token) = self.state.lock().polling.take() {
            token.cancel();
        }
    }

    fn spawn_poller(&self, episode: u64, token: CancellationToken) {
        let monitor = self.clone();
        spawn_ticker("recovery-monitor", self.poll_interval, token, move || {
            let monitor = monitor.clone();
            async move { monitor.poll_once(episode).await }
        });
    }

    async fn poll_once(&self, episode: u64) -> ControlFlow<()> {
        let command = match self.lookup().await {
            Ok(command) => command,
            Err(e) => {
                tracing::warn!(run_id = %self.run_id, episode, error = %e, "failed command lookup failed");
                return ControlFlow::Continue(());
            }
        };
        if !self.apply(episode, command) {
            return ControlFlow::Continue(());
        }
        let input = Input::FailedCommand { episode, command: self.current() };
        match self.input_tx.send(input).await {
            Ok(()) => ControlFlow::Continue(()),
            Err(_) => ControlFlow::Break(()),
        }
    }

    async fn lookup(&self) -> Result<Option<FailedCommand>, RobotError> {
        let summary = self.robot.command_summary(&self.run_id, self.page_length).await?;
        let Some(link) = summary.currently_recovering_from else {
            return Ok(None);
        };
        let cached = self.state.lock().details.get(&link.command_id).cloned();
        if let Some(command) = cached {
            return Ok(Some(command));
        }
        let command = self.robot.command(&link.run_id, &link.command_id).await?;
        Ok(Some(command))
    }

    /// Record a completed lookup. Returns whether the reported value changed.
    fn apply(&self, episode: u64, command: Option<FailedCommand>) -> bool {
        let mut st = self.state.lock();
        if st.episode != episode || st.polling.is_none() {
            tracing::debug!(run_id = %self.run_id, episode, "discarding stale lookup");
            return false;
        }
        let command = match command {
            Some(c) => {
                st.details.insert(c.id.clone(), c.clone());
                Some(c)
            }
            // A missing link mid-episode keeps the last resolved command.
            None if st.ready => st.current.clone(),
            None => None,
        };
        let changed = !st.ready || st.current != command;
        if changed {
            tracing::info!(
                run_id = %self.run_id,
                episode,
                command_id = command.as_ref().map(|c| c.id.as_str()).unwrap_or("-"),
                "failed command resolved"
            );
        }
        st.ready = true;
        st.current = command;
        changed
    }
}

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;
