// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recovery session state and its transition functions.
//!
//! The session never performs I/O. Every mutation goes through a method
//! here so transitions can be tested without a runtime.

use crate::route::{DoorRequirement, InvalidTransition, RecoveryRoute, RecoveryStep, RoutePosition};
use crate::run_status::RunStatus;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoverySession {
    /// Strategy the operator picked. Robot routes never overwrite it.
    pub selected_route: Option<RecoveryRoute>,
    pub position: RoutePosition,
    /// Sticky for the episode; see [`RecoverySession::is_er_active`].
    pub has_seen_awaiting_recovery: bool,
    pub is_motion_routing: bool,
    /// Where to return when a motion detour ends.
    resume_position: Option<RoutePosition>,
    /// Where to return once the door closes after parking on a door route.
    door_return: Option<RoutePosition>,
}

impl Default for RecoverySession {
    fn default() -> Self {
        Self {
            selected_route: None,
            position: RoutePosition::OPTION_SELECTION,
            has_seen_awaiting_recovery: false,
            is_motion_routing: false,
            resume_position: None,
            door_return: None,
        }
    }
}

/// Outcome of folding a run status into the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeChange {
    None,
    Started,
    Ended,
}

impl RecoverySession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in the latest run status.
    ///
    /// Leaving the extended recovery set ends the episode and resets the
    /// session so the next episode starts clean.
    pub fn observe_status(&mut self, status: RunStatus) -> EpisodeChange {
        if status == RunStatus::AwaitingRecovery && !self.has_seen_awaiting_recovery {
            self.has_seen_awaiting_recovery = true;
            return EpisodeChange::Started;
        }
        if !status.is_extended_recovery_status() && self.has_seen_awaiting_recovery {
            *self = Self::default();
            return EpisodeChange::Ended;
        }
        EpisodeChange::None
    }

    /// Recovery is active when the run is exactly awaiting recovery, or
    /// when it is in any extended recovery status after this episode has
    /// been seen awaiting recovery. The second clause keeps recovery up
    /// through cancellation without activating it for a client that only
    /// happens to see `stop-requested` outside an episode.
    pub fn is_er_active(&self, status: Option<RunStatus>) -> bool {
        match status {
            Some(RunStatus::AwaitingRecovery) => true,
            Some(s) => s.is_extended_recovery_status() && self.has_seen_awaiting_recovery,
            None => false,
        }
    }

    /// Start the strategy `route` from its entry step.
    pub fn select_option(&mut self, route: RecoveryRoute) -> Result<RoutePosition, InvalidTransition> {
        if !route.is_selectable() {
            self.fallback();
            return Err(InvalidTransition::UnknownRoute(route.to_string()));
        }
        self.selected_route = Some(route);
        self.move_to(RoutePosition::entry(route));
        Ok(self.position)
    }

    /// Jump to `route`/`step` (entry step when `None`).
    ///
    /// An invalid combination lands on option selection and the error is
    /// returned for the caller to report.
    pub fn proceed_to(
        &mut self,
        route: RecoveryRoute,
        step: Option<RecoveryStep>,
    ) -> Result<RoutePosition, InvalidTransition> {
        match RoutePosition::resolve(route, step) {
            Ok(pos) => {
                self.move_to(pos);
                Ok(pos)
            }
            Err(e) => {
                self.fallback();
                Err(e)
            }
        }
    }

    /// Advance along the current route. Past the last step the session
    /// returns to option selection.
    pub fn proceed_next_step(&mut self) -> RoutePosition {
        match self.position.route.next_after(self.position.step) {
            Some(step) => self.move_to(RoutePosition { route: self.position.route, step }),
            None => self.move_to(RoutePosition::OPTION_SELECTION),
        }
        self.position
    }

    /// Step back along the current route. At the entry step the session
    /// returns to option selection.
    pub fn go_back_prev_step(&mut self) -> RoutePosition {
        match self.position.route.prev_before(self.position.step) {
            Some(step) => self.move_to(RoutePosition { route: self.position.route, step }),
            None => self.move_to(RoutePosition::OPTION_SELECTION),
        }
        self.position
    }

    /// Enter a motion detour on `route`, remembering where to come back to.
    pub fn begin_motion(&mut self, route: RecoveryRoute) {
        if !self.is_motion_routing {
            self.resume_position = Some(self.position);
        }
        self.is_motion_routing = true;
        self.position = RoutePosition::entry(route);
    }

    /// Leave the motion detour, restoring the pre-motion position.
    pub fn end_motion(&mut self) {
        self.is_motion_routing = false;
        if let Some(pos) = self.resume_position.take() {
            self.position = pos;
        }
    }

    /// Park on the door-open screen until the door closes. Gripper steps
    /// park on the gripper variant.
    pub fn park_for_door(&mut self) {
        if self.is_parked_for_door() {
            return;
        }
        let route = match self.position.door_requirement() {
            DoorRequirement::Special => RecoveryRoute::RobotDoorOpenSpecial,
            DoorRequirement::MustBeClosed | DoorRequirement::MayBeOpen => RecoveryRoute::RobotDoorOpen,
        };
        self.door_return = Some(self.position);
        self.position = RoutePosition::entry(route);
    }

    /// Return from the door-open screen. Returns false when not parked.
    pub fn leave_door_park(&mut self) -> bool {
        if !self.is_parked_for_door() {
            return false;
        }
        self.position = self.door_return.take().unwrap_or(RoutePosition::OPTION_SELECTION);
        true
    }

    pub fn is_parked_for_door(&self) -> bool {
        matches!(
            self.position.route,
            RecoveryRoute::RobotDoorOpen | RecoveryRoute::RobotDoorOpenSpecial
        )
    }

    pub fn fallback(&mut self) {
        self.move_to(RoutePosition::OPTION_SELECTION);
    }

    fn move_to(&mut self, pos: RoutePosition) {
        self.door_return = None;
        if pos.route.is_selectable() {
            self.selected_route = Some(pos.route);
        }
        self.position = pos;
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
