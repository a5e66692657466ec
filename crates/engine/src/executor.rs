// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command executor
//!
//! Runs hardware recipes one at a time. A recipe brackets its hardware
//! call with motion routing, awaits each step before the next, and routes
//! the session to the resulting step. The door fork is read once when the
//! recipe starts. Only the controller reaches the executor, after checking
//! that this session may drive.

use crate::error::RecoveryError;
use crate::state::SessionCore;
use er_adapters::RobotClient;
use er_core::{
    HardwareAction, RecipeFailure, RecipeKind, RecoveryRoute, RecoveryStep, RoutePosition,
    SessionEvent,
};
use std::future::Future;
use std::time::Instant;

/// Clears the in-flight recipe when dropped, including when the recipe
/// future is cancelled mid-way.
struct InFlight {
    core: SessionCore,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.core.update(|st| st.recipe_in_flight = None);
    }
}

#[derive(Clone)]
pub(crate) struct CommandExecutor<R: RobotClient> {
    robot: R,
    core: SessionCore,
}

impl<R: RobotClient> CommandExecutor<R> {
    pub(crate) fn new(robot: R, core: SessionCore) -> Self {
        Self { robot, core }
    }

    pub(crate) async fn release_gripper_jaws(&self) -> Result<(), RecoveryError> {
        self.dispatch(HardwareAction::ReleaseGripperJaws).await
    }

    pub(crate) async fn home_except_plungers(&self) -> Result<(), RecoveryError> {
        self.dispatch(HardwareAction::HomeExceptPlungers).await
    }

    pub(crate) async fn resume_from_recovery(&self) -> Result<(), RecoveryError> {
        self.dispatch(HardwareAction::ResumeFromRecovery).await
    }

    pub(crate) async fn stop_run(&self) -> Result<(), RecoveryError> {
        self.dispatch(HardwareAction::StopRun).await
    }

    /// Enter or leave the generic in-motion detour.
    pub(crate) async fn set_motion_routing(&self, in_motion: bool) {
        if in_motion {
            self.set_motion_routing_via(RecoveryRoute::RobotInMotion).await;
        } else {
            self.core.update(|st| st.session.end_motion());
        }
    }

    /// Enter the motion detour shown on `route`.
    pub(crate) async fn set_motion_routing_via(&self, route: RecoveryRoute) {
        self.core.update(|st| st.session.begin_motion(route));
    }

    /// Jump to `route`/`step`. An invalid pair lands on option selection.
    pub(crate) async fn move_to_route_and_step(
        &self,
        route: RecoveryRoute,
        step: Option<RecoveryStep>,
    ) -> RoutePosition {
        self.core.update(|st| match st.session.proceed_to(route, step) {
            Ok(pos) => pos,
            Err(e) => {
                tracing::error!(run_id = %self.core.run_id(), error = %e, "invalid route transition");
                st.session.position
            }
        })
    }

    pub(crate) async fn proceed_to_next_step(&self) -> RoutePosition {
        self.core.update(|st| st.session.proceed_next_step())
    }

    /// Run `recipe` to completion.
    ///
    /// Fails fast with [`RecoveryError::RecipeInFlight`] when another recipe
    /// is outstanding. A hardware failure aborts the rest of the recipe,
    /// leaves motion routing, and routes to the failure step.
    pub(crate) async fn run_recipe(&self, recipe: RecipeKind) -> Result<(), RecoveryError> {
        let _in_flight = self.begin(recipe)?;
        let door_open = self.core.read(|st| st.door.is_open);
        tracing::info!(run_id = %self.core.run_id(), %recipe, door_open, "recipe started");

        let result = match recipe {
            RecipeKind::GripperRelease => self.gripper_release(door_open).await,
            RecipeKind::HomeGripperZ => self.home_gripper_z(door_open).await,
            RecipeKind::HomeAndRetry => self.home_and_retry(door_open).await,
            RecipeKind::ResumeRun => self.resume_run(door_open).await,
            RecipeKind::CancelRun => self.cancel_run().await,
        };

        match &result {
            Ok(()) => {
                tracing::info!(run_id = %self.core.run_id(), %recipe, "recipe finished");
                self.core.emit(SessionEvent::RecipeFinished { recipe });
            }
            Err(e) => self.fail(recipe, e),
        }
        result
    }

    fn begin(&self, recipe: RecipeKind) -> Result<InFlight, RecoveryError> {
        self.core.update(|st| match st.recipe_in_flight {
            Some(running) => Err(RecoveryError::RecipeInFlight(running)),
            None => {
                st.recipe_in_flight = Some(recipe);
                st.recipe_failure = None;
                Ok(())
            }
        })?;
        Ok(InFlight { core: self.core.clone() })
    }

    fn fail(&self, recipe: RecipeKind, error: &RecoveryError) {
        let reason = error.to_string();
        tracing::error!(run_id = %self.core.run_id(), %recipe, error = %reason, "recipe failed");
        self.core.update(|st| {
            st.recipe_failure = Some(RecipeFailure { recipe, reason: reason.clone() });
            if st.session.proceed_to(RecoveryRoute::ErrorWhileRecovering, None).is_err() {
                st.session.fallback();
            }
        });
        self.core.emit(SessionEvent::RecipeFailed { recipe, reason });
    }

    async fn dispatch(&self, action: HardwareAction) -> Result<(), RecoveryError> {
        let run_id = self.core.run_id();
        self.core.emit(SessionEvent::HardwareDispatched { action });
        let start = Instant::now();
        match self.robot.dispatch(run_id, action).await {
            Ok(()) => {
                let elapsed_ms = start.elapsed().as_millis() as u64;
                tracing::info!(%run_id, %action, elapsed_ms, "hardware action completed");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(%run_id, %action, error = %e, "hardware action failed");
                Err(e.into())
            }
        }
    }

    /// motion(true) → `op` → motion(false). Motion routing is left on
    /// every path out.
    async fn with_motion(
        &self,
        route: RecoveryRoute,
        op: impl Future<Output = Result<(), RecoveryError>>,
    ) -> Result<(), RecoveryError> {
        self.set_motion_routing_via(route).await;
        let result = op.await;
        self.set_motion_routing(false).await;
        result
    }

    /// Like [`Self::with_motion`] but the detour stays up on success. Used
    /// by recipes that end the recovery episode.
    async fn with_motion_held(
        &self,
        route: RecoveryRoute,
        op: impl Future<Output = Result<(), RecoveryError>>,
    ) -> Result<(), RecoveryError> {
        self.set_motion_routing_via(route).await;
        let result = op.await;
        if result.is_err() {
            self.set_motion_routing(false).await;
        }
        result
    }

    fn selected_route(&self) -> Option<RecoveryRoute> {
        self.core.read(|st| st.session.selected_route)
    }

    fn unhandled(&self, recipe: RecipeKind, route: Option<RecoveryRoute>) {
        tracing::error!(
            run_id = %self.core.run_id(),
            %recipe,
            route = route.map(|r| r.as_str()).unwrap_or("-"),
            "recipe has no transition for the selected route"
        );
    }

    /// Manual route and its hand-handling step, if the selection has one.
    fn manual_target(&self, recipe: RecipeKind) -> Option<(RecoveryRoute, RecoveryStep)> {
        let selected = self.selected_route();
        let target = selected.and_then(|r| r.manual_handling_step().map(|s| (r, s)));
        if target.is_none() {
            self.unhandled(recipe, selected);
        }
        target
    }

    async fn gripper_release(&self, door_open: bool) -> Result<(), RecoveryError> {
        let target = self.manual_target(RecipeKind::GripperRelease);
        if door_open {
            match target {
                Some((route, _)) => {
                    self.move_to_route_and_step(route, Some(RecoveryStep::CloseDoorGripperZHome))
                        .await
                }
                None => self.move_to_route_and_step(RecoveryRoute::OptionSelection, None).await,
            };
            return Ok(());
        }

        self.with_motion(RecoveryRoute::RobotReleasingLabware, self.release_gripper_jaws()).await?;
        match target {
            Some((route, step)) => self.move_to_route_and_step(route, Some(step)).await,
            None => self.proceed_to_next_step().await,
        };
        Ok(())
    }

    async fn home_gripper_z(&self, door_open: bool) -> Result<(), RecoveryError> {
        let target = self.manual_target(RecipeKind::HomeGripperZ);
        if door_open {
            match target {
                Some((route, _)) => {
                    self.move_to_route_and_step(route, Some(RecoveryStep::CloseDoorGripperZHome))
                        .await
                }
                None => self.move_to_route_and_step(RecoveryRoute::OptionSelection, None).await,
            };
            return Ok(());
        }

        self.with_motion(RecoveryRoute::RobotInMotion, self.home_except_plungers()).await?;
        match target {
            Some((route, step)) => self.move_to_route_and_step(route, Some(step)).await,
            None => self.proceed_to_next_step().await,
        };
        Ok(())
    }

    async fn home_and_retry(&self, door_open: bool) -> Result<(), RecoveryError> {
        let selected = self.selected_route();
        let known = selected == Some(RecoveryRoute::HomeAndRetry);
        if !known {
            self.unhandled(RecipeKind::HomeAndRetry, selected);
        }
        if door_open {
            if known {
                self.move_to_route_and_step(
                    RecoveryRoute::HomeAndRetry,
                    Some(RecoveryStep::CloseDoorAndHome),
                )
                .await;
            } else {
                self.move_to_route_and_step(RecoveryRoute::OptionSelection, None).await;
            }
            return Ok(());
        }

        self.with_motion(RecoveryRoute::RobotInMotion, self.home_except_plungers()).await?;
        if known {
            self.move_to_route_and_step(RecoveryRoute::HomeAndRetry, Some(RecoveryStep::ConfirmRetry))
                .await;
        } else {
            self.proceed_to_next_step().await;
        }
        Ok(())
    }

    async fn resume_run(&self, door_open: bool) -> Result<(), RecoveryError> {
        if door_open {
            tracing::info!(run_id = %self.core.run_id(), "door open; waiting on the door screen");
            self.core.update(|st| st.session.park_for_door());
            return Ok(());
        }
        let route = resume_motion_route(self.selected_route());
        self.with_motion_held(route, self.resume_from_recovery()).await
    }

    async fn cancel_run(&self) -> Result<(), RecoveryError> {
        self.with_motion_held(RecoveryRoute::RobotCanceling, self.stop_run()).await
    }
}

/// Detour shown while the run resumes after the strategy in `selected`.
fn resume_motion_route(selected: Option<RecoveryRoute>) -> RecoveryRoute {
    use RecoveryRoute as R;
    match selected {
        Some(
            R::RetryStep | R::RetryNewTips | R::RetrySameTips | R::ManualReplaceAndRetry
            | R::HomeAndRetry,
        ) => R::RobotRetryingStep,
        Some(
            R::SkipStepWithNewTips | R::SkipStepWithSameTips | R::IgnoreAndSkip
            | R::ManualFillAndSkip | R::ManualMoveAndSkip,
        ) => R::RobotSkippingStep,
        _ => R::RobotResuming,
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
