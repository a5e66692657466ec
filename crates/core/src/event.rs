// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! What the recovery core tells presentation layers.

use crate::command::FailedCommand;
use crate::countdown::CountdownState;
use crate::door::{DoorNotice, DoorStatus};
use crate::id::{CommandId, RunId, SessionId};
use crate::route::{RecoveryRoute, RecoveryStep, RoutePosition, StepMeta};
use crate::run_status::RunStatus;
use crate::takeover::TakeoverState;
use serde::{Deserialize, Serialize};

crate::string_enum! {
    /// A call that moves or actuates hardware.
    pub enum HardwareAction {
        ReleaseGripperJaws => "release-gripper-jaws",
        HomeExceptPlungers => "home-except-plungers",
        ResumeFromRecovery => "resume-from-recovery",
        StopRun => "stop",
    }
}

crate::string_enum! {
    /// Named multi-command hardware sequence.
    pub enum RecipeKind {
        GripperRelease => "gripper-release",
        HomeGripperZ => "home-gripper-z",
        HomeAndRetry => "home-and-retry",
        ResumeRun => "resume-run",
        CancelRun => "cancel-run",
    }
}

/// Ordered notifications emitted by a session controller.
///
/// Serializes with `{"type": "area:name", ...fields}` format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    #[serde(rename = "session:activity")]
    ActivityChanged { active: bool },

    #[serde(rename = "session:failed_command")]
    FailedCommandChanged { command_id: Option<CommandId> },

    #[serde(rename = "route:changed")]
    RouteChanged { from: RoutePosition, to: RoutePosition },

    #[serde(rename = "motion:routing")]
    MotionRouting { in_motion: bool },

    #[serde(rename = "hardware:dispatched")]
    HardwareDispatched { action: HardwareAction },

    #[serde(rename = "recipe:finished")]
    RecipeFinished { recipe: RecipeKind },

    #[serde(rename = "recipe:failed")]
    RecipeFailed { recipe: RecipeKind, reason: String },

    #[serde(rename = "countdown:tick")]
    CountdownTick { step: RecoveryStep, seconds_remaining: u32 },

    #[serde(rename = "door:changed")]
    DoorChanged { status: DoorStatus },

    #[serde(rename = "takeover:changed")]
    TakeoverChanged { state: TakeoverState },

    /// Another session claimed the lease this session held.
    #[serde(rename = "takeover:lost")]
    TakeoverLost { new_owner: Option<SessionId> },
}

crate::simple_display! {
    SessionEvent {
        ActivityChanged { .. } => "session:activity",
        FailedCommandChanged { .. } => "session:failed_command",
        RouteChanged { .. } => "route:changed",
        MotionRouting { .. } => "motion:routing",
        HardwareDispatched { .. } => "hardware:dispatched",
        RecipeFinished { .. } => "recipe:finished",
        RecipeFailed { .. } => "recipe:failed",
        CountdownTick { .. } => "countdown:tick",
        DoorChanged { .. } => "door:changed",
        TakeoverChanged { .. } => "takeover:changed",
        TakeoverLost { .. } => "takeover:lost",
    }
}

/// Last failed recipe, kept until the operator acknowledges it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeFailure {
    pub recipe: RecipeKind,
    pub reason: String,
}

/// Read-only copy of everything a presentation layer may show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub run_id: RunId,
    pub run_status: Option<RunStatus>,
    #[serde(rename = "isERActive")]
    pub is_er_active: bool,
    pub current_route: RecoveryRoute,
    pub current_step: RecoveryStep,
    /// Graph metadata for the current position.
    pub step_meta: StepMeta,
    pub selected_route: Option<RecoveryRoute>,
    pub is_motion_routing: bool,
    pub failed_command: Option<FailedCommand>,
    pub door_status: DoorStatus,
    /// Which door notice to show, if the door is open where it must not be.
    pub door_notice: Option<DoorNotice>,
    pub takeover_state: TakeoverState,
    pub countdown: Option<CountdownState>,
    pub recipe_in_flight: Option<RecipeKind>,
    pub recipe_failure: Option<RecipeFailure>,
}

impl SessionSnapshot {
    pub fn countdown_seconds_remaining(&self) -> Option<u32> {
        self.countdown.map(|c| c.seconds_remaining)
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
