// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recovery session controller
//!
//! Composition root for one run. Owns the session state, feeds pollers and
//! timers through a single input channel, and exposes the operator intents.
//! Every intent that changes the shared route or touches hardware requires
//! an active recovery and the ownership lease.

use crate::config::EngineConfig;
use crate::countdown::CountdownService;
use crate::error::RecoveryError;
use crate::executor::CommandExecutor;
use crate::input::Input;
use crate::monitor::RecoveryStatusMonitor;
use crate::state::{ControllerState, SessionCore};
use crate::takeover::TakeoverArbiter;
use crate::ticker::spawn_ticker;
use er_adapters::{OwnershipSource, RobotClient};
use er_core::{
    EpisodeChange, FailedCommand, RecipeKind, RecoveryRoute, RecoveryStep, RoutePosition, RunId,
    RunStatus, SessionEvent, SessionId, SessionSnapshot,
};
use std::ops::ControlFlow;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Adapters the controller drives
pub struct ControllerDeps<R, O> {
    pub robot: R,
    pub ownership: O,
}

#[derive(Clone)]
pub struct RecoveryController<R: RobotClient, O: OwnershipSource> {
    core: SessionCore,
    robot: R,
    monitor: RecoveryStatusMonitor<R>,
    executor: CommandExecutor<R>,
    arbiter: TakeoverArbiter<O>,
    config: EngineConfig,
    input_tx: mpsc::Sender<Input>,
}

impl<R, O> RecoveryController<R, O>
where
    R: RobotClient,
    O: OwnershipSource,
{
    pub fn new(
        run_id: RunId,
        session_id: SessionId,
        deps: ControllerDeps<R, O>,
        config: EngineConfig,
        input_tx: mpsc::Sender<Input>,
        event_tx: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        let countdown = CountdownService::new(config.countdown_secs, input_tx.clone());
        let core = SessionCore::new(run_id.clone(), countdown, event_tx);
        let monitor = RecoveryStatusMonitor::new(
            deps.robot.clone(),
            run_id,
            config.poll_interval,
            config.page_length,
            input_tx.clone(),
        );
        let executor = CommandExecutor::new(deps.robot.clone(), core.clone());
        let arbiter = TakeoverArbiter::new(deps.ownership, session_id, core.clone());
        Self { core, robot: deps.robot, monitor, executor, arbiter, config, input_tx }
    }

    pub fn run_id(&self) -> &RunId {
        self.core.run_id()
    }

    pub fn session_id(&self) -> &SessionId {
        self.arbiter.session_id()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.core.snapshot()
    }

    pub fn monitor(&self) -> &RecoveryStatusMonitor<R> {
        &self.monitor
    }

    /// Process inputs until `shutdown` fires or every sender is gone.
    pub async fn run(self, mut inputs: mpsc::Receiver<Input>, shutdown: CancellationToken) {
        loop {
            let input = tokio::select! {
                _ = shutdown.cancelled() => break,
                input = inputs.recv() => match input {
                    Some(input) => input,
                    None => break,
                },
            };
            self.handle(input).await;
        }
        self.monitor.shutdown();
        self.core.countdown().cancel();
        tracing::info!(run_id = %self.run_id(), "controller stopped");
    }

    /// Start the run status and ownership heartbeat pollers.
    pub fn spawn_pollers(&self, token: CancellationToken) -> Vec<JoinHandle<()>> {
        let status = {
            let robot = self.robot.clone();
            let run_id = self.run_id().clone();
            let tx = self.input_tx.clone();
            spawn_ticker("run-status", self.config.poll_interval, token.clone(), move || {
                let (robot, run_id, tx) = (robot.clone(), run_id.clone(), tx.clone());
                async move {
                    match robot.run_status(&run_id).await {
                        Ok(status) => forward(&tx, Input::RunStatus(status)).await,
                        Err(e) => {
                            tracing::warn!(%run_id, error = %e, "run status poll failed");
                            ControlFlow::Continue(())
                        }
                    }
                }
            })
        };
        let heartbeat = {
            let arbiter = self.arbiter.clone();
            let tx = self.input_tx.clone();
            spawn_ticker("ownership", self.config.heartbeat_interval, token, move || {
                let (arbiter, tx) = (arbiter.clone(), tx.clone());
                async move {
                    match arbiter.read_lease().await {
                        Ok(input) => forward(&tx, input).await,
                        Err(e) => {
                            tracing::warn!(error = %e, "ownership heartbeat failed");
                            ControlFlow::Continue(())
                        }
                    }
                }
            })
        };
        vec![status, heartbeat]
    }

    pub async fn handle(&self, input: Input) {
        tracing::trace!(run_id = %self.run_id(), input = %input, "controller input");
        match input {
            Input::RunStatus(status) => self.observe_status(status).await,
            Input::FailedCommand { episode, command } => self.apply_failed_command(episode, command),
            Input::CountdownTick { step, generation, remaining } => {
                self.countdown_tick(step, generation, remaining)
            }
            Input::Ownership { generation, owner } => self.arbiter.observe(generation, owner),
            Input::ContextLoaded(loaded) => self.set_context_loaded(loaded),
        }
    }

    /// Read the lease as the heartbeat does. The result is meant for
    /// [`Self::handle`].
    pub async fn read_lease(&self) -> Result<Input, RecoveryError> {
        self.arbiter.read_lease().await.map_err(RecoveryError::Ownership)
    }

    pub fn set_context_loaded(&self, loaded: bool) {
        self.core.update(|st| st.context_loaded = loaded);
    }

    async fn observe_status(&self, status: RunStatus) {
        let (change, was_driving) = self.core.update(|st| {
            let was_driving = st.takeover.is_active_user;
            st.run_status = Some(status);
            if !status.is_recovery_eligible() {
                st.failed_command = None;
            }
            let change = st.session.observe_status(status);
            if change == EpisodeChange::Ended {
                st.retained_command = None;
                st.recipe_failure = None;
            }
            (change, was_driving)
        });
        self.monitor.observe(status);

        match change {
            EpisodeChange::Started => {
                tracing::info!(run_id = %self.run_id(), "recovery episode started");
            }
            EpisodeChange::Ended => {
                tracing::info!(run_id = %self.run_id(), %status, "recovery episode ended");
                if was_driving {
                    if let Err(e) = self.arbiter.release().await {
                        tracing::warn!(run_id = %self.run_id(), error = %e, "lease release failed");
                    }
                }
            }
            EpisodeChange::None => {}
        }
    }

    fn apply_failed_command(&self, episode: u64, command: Option<FailedCommand>) {
        if episode != self.monitor.episode() {
            tracing::debug!(run_id = %self.run_id(), episode, "dropping failed command from a finished episode");
            return;
        }
        self.core.update(|st| {
            if !st.run_status.is_some_and(RunStatus::is_recovery_eligible) {
                return;
            }
            if command.is_some() {
                st.retained_command = command.clone();
            }
            st.failed_command = command;
        });
    }

    fn countdown_tick(&self, step: RecoveryStep, generation: u64, remaining: u32) {
        let elapsed = self.core.update(|st| match st.countdown.as_mut() {
            Some(c) if c.accepts(step, generation) => c.tick(remaining),
            _ => false,
        });
        if !elapsed {
            return;
        }
        tracing::info!(run_id = %self.run_id(), %step, "countdown elapsed; releasing labware");
        let this = self.clone();
        tokio::spawn(async move {
            if let Err(e) = this.run_recipe(RecipeKind::GripperRelease).await {
                tracing::warn!(run_id = %this.run_id(), error = %e, "countdown recipe not run");
            }
        });
    }

    fn ensure_can_drive(&self) -> Result<(), RecoveryError> {
        if !self.core.read(ControllerState::is_er_active) {
            return Err(RecoveryError::Inactive(self.run_id().clone()));
        }
        self.arbiter.ensure_active()
    }

    /// Open (`true`) or close the recovery UI for this session.
    ///
    /// Opening claims the lease or surfaces the takeover prompt. Closing
    /// releases the lease and returns to option selection.
    pub async fn toggle_recovery(&self, open: bool) -> Result<(), RecoveryError> {
        if !open {
            self.arbiter.release().await?;
            self.core.update(|st| st.session.fallback());
            return Ok(());
        }
        if !self.core.read(ControllerState::is_er_active) {
            return Err(RecoveryError::Inactive(self.run_id().clone()));
        }
        self.arbiter.open().await
    }

    pub async fn confirm_takeover(&self) -> Result<(), RecoveryError> {
        self.arbiter.claim().await
    }

    pub fn dismiss_takeover(&self) {
        self.arbiter.dismiss();
    }

    pub fn select_option(&self, route: RecoveryRoute) -> Result<RoutePosition, RecoveryError> {
        self.ensure_can_drive()?;
        Ok(self.core.update(|st| match st.session.select_option(route) {
            Ok(pos) => pos,
            Err(e) => {
                tracing::error!(run_id = %self.run_id(), error = %e, "invalid recovery option");
                st.session.position
            }
        }))
    }

    pub fn proceed_next_step(&self) -> Result<RoutePosition, RecoveryError> {
        self.ensure_can_drive()?;
        Ok(self.core.update(|st| st.session.proceed_next_step()))
    }

    pub fn go_back_prev_step(&self) -> Result<RoutePosition, RecoveryError> {
        self.ensure_can_drive()?;
        Ok(self.core.update(|st| st.session.go_back_prev_step()))
    }

    pub fn proceed_to_route_and_step(
        &self,
        route: RecoveryRoute,
        step: Option<RecoveryStep>,
    ) -> Result<RoutePosition, RecoveryError> {
        self.ensure_can_drive()?;
        Ok(self.core.update(|st| match st.session.proceed_to(route, step) {
            Ok(pos) => pos,
            Err(e) => {
                tracing::error!(run_id = %self.run_id(), error = %e, "invalid route transition");
                st.session.position
            }
        }))
    }

    /// [`Self::proceed_to_route_and_step`] with names as they arrive from
    /// the presentation layer. Unknown names land on option selection.
    pub fn proceed_to_named(
        &self,
        route: &str,
        step: Option<&str>,
    ) -> Result<RoutePosition, RecoveryError> {
        self.ensure_can_drive()?;
        Ok(self.core.update(|st| match RoutePosition::resolve_named(route, step) {
            Ok(pos) => st
                .session
                .proceed_to(pos.route, Some(pos.step))
                .unwrap_or(RoutePosition::OPTION_SELECTION),
            Err(e) => {
                tracing::error!(run_id = %self.run_id(), error = %e, "invalid route transition");
                st.session.fallback();
                st.session.position
            }
        }))
    }

    pub async fn run_recipe(&self, recipe: RecipeKind) -> Result<(), RecoveryError> {
        self.ensure_can_drive()?;
        self.executor.run_recipe(recipe).await
    }

    /// Clear a surfaced recipe failure and return to option selection.
    pub fn acknowledge_failure(&self) -> Result<RoutePosition, RecoveryError> {
        self.ensure_can_drive()?;
        Ok(self.core.update(|st| {
            st.recipe_failure = None;
            st.session.fallback();
            st.session.position
        }))
    }
}

async fn forward(tx: &mpsc::Sender<Input>, input: Input) -> ControlFlow<()> {
    match tx.send(input).await {
        Ok(()) => ControlFlow::Continue(()),
        Err(_) => ControlFlow::Break(()),
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
