// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Static route graph.
//!
//! A route is a recovery strategy; its steps are the ordered stages the
//! operator walks through. The first step is the entry step. Terminal steps
//! are the ones that hand the run back to the robot (retry, skip, cancel).
//! The `robot-*` routes are transient screens shown while the robot is
//! busy and are never offered as options.

use serde::{Deserialize, Serialize};
use thiserror::Error;

crate::string_enum! {
    /// Top-level recovery strategy.
    pub enum RecoveryRoute {
        OptionSelection => "option-selection",
        RetryStep => "retry-step",
        RetryNewTips => "retry-new-tips",
        RetrySameTips => "retry-same-tips",
        SkipStepWithNewTips => "skip-step-with-new-tips",
        SkipStepWithSameTips => "skip-step-with-same-tips",
        IgnoreAndSkip => "ignore-and-skip",
        ManualFillAndSkip => "manual-fill-and-skip",
        ManualMoveAndSkip => "manual-move-and-skip",
        ManualReplaceAndRetry => "manual-replace-and-retry",
        HomeAndRetry => "home-and-retry",
        CancelRun => "cancel-run",
        RobotInMotion => "robot-in-motion",
        RobotResuming => "robot-resuming",
        RobotRetryingStep => "robot-retrying-step",
        RobotCanceling => "robot-canceling",
        RobotSkippingStep => "robot-skipping-step",
        RobotReleasingLabware => "robot-releasing-labware",
        RobotDoorOpen => "robot-door-open",
        RobotDoorOpenSpecial => "robot-door-open-special",
        ErrorWhileRecovering => "error-while-recovering",
    }
}

crate::string_enum! {
    /// One stage of a route.
    pub enum RecoveryStep {
        SelectRecoveryOption => "select-recovery-option",
        ConfirmRetry => "confirm-retry",
        DropTipFlows => "drop-tip-flows",
        ReplaceTips => "replace-tips",
        SelectTips => "select-tips",
        RetryWithNewTips => "retry-with-new-tips",
        RetryWithSameTips => "retry-with-same-tips",
        SkipWithNewTips => "skip-with-new-tips",
        SkipWithSameTips => "skip-with-same-tips",
        SelectIgnoreKind => "select-ignore-kind",
        ManualFill => "manual-fill",
        GripperHoldingLabware => "gripper-holding-labware",
        GripperReleaseLabware => "gripper-release-labware",
        CloseDoorGripperZHome => "close-door-gripper-z-home",
        ManualMove => "manual-move",
        ManualReplace => "manual-replace",
        SkipToNextStep => "skip-to-next-step",
        PrepareDeckForHome => "prepare-deck-for-home",
        RemoveTipsFromPipette => "remove-tips-from-pipette",
        CloseDoorAndHome => "close-door-and-home",
        ConfirmCancel => "confirm-cancel",
        InMotion => "in-motion",
        Resuming => "resuming",
        RetryingStep => "retrying-step",
        Canceling => "canceling",
        Skipping => "skipping",
        ReleasingLabware => "releasing-labware",
        DoorOpen => "door-open",
        DoorOpenSpecial => "door-open-special",
        RecoveryActionFailed => "recovery-action-failed",
    }
}

/// Door state a step needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DoorRequirement {
    MayBeOpen,
    MustBeClosed,
    /// Must be closed; the gripper variant of the door notice applies.
    Special,
}

impl RecoveryStep {
    pub fn door_requirement(self) -> DoorRequirement {
        use RecoveryStep::*;
        match self {
            GripperReleaseLabware | CloseDoorGripperZHome | ReleasingLabware => {
                DoorRequirement::Special
            }
            ConfirmRetry | DropTipFlows | RetryWithNewTips | RetryWithSameTips
            | SkipWithNewTips | SkipWithSameTips | SkipToNextStep | CloseDoorAndHome
            | InMotion | Resuming | RetryingStep | Skipping => DoorRequirement::MustBeClosed,
            SelectRecoveryOption | ReplaceTips | SelectTips | SelectIgnoreKind | ManualFill
            | GripperHoldingLabware | ManualMove | ManualReplace | PrepareDeckForHome
            | RemoveTipsFromPipette | ConfirmCancel | Canceling | DoorOpen | DoorOpenSpecial
            | RecoveryActionFailed => DoorRequirement::MayBeOpen,
        }
    }
}

impl RecoveryRoute {
    /// Ordered steps of this route. Never empty.
    pub fn steps(self) -> &'static [RecoveryStep] {
        use RecoveryRoute as R;
        use RecoveryStep as S;
        match self {
            R::OptionSelection => &[S::SelectRecoveryOption],
            R::RetryStep => &[S::ConfirmRetry],
            R::RetryNewTips => &[S::DropTipFlows, S::ReplaceTips, S::SelectTips, S::RetryWithNewTips],
            R::RetrySameTips => &[S::RetryWithSameTips],
            R::SkipStepWithNewTips => {
                &[S::DropTipFlows, S::ReplaceTips, S::SelectTips, S::SkipWithNewTips]
            }
            R::SkipStepWithSameTips => &[S::SkipWithSameTips],
            R::IgnoreAndSkip => &[S::SelectIgnoreKind, S::SkipToNextStep],
            R::ManualFillAndSkip => &[S::ManualFill, S::SkipToNextStep],
            R::ManualMoveAndSkip => &[
                S::GripperHoldingLabware,
                S::GripperReleaseLabware,
                S::CloseDoorGripperZHome,
                S::ManualMove,
                S::SkipToNextStep,
            ],
            R::ManualReplaceAndRetry => &[
                S::GripperHoldingLabware,
                S::GripperReleaseLabware,
                S::CloseDoorGripperZHome,
                S::ManualReplace,
                S::ConfirmRetry,
            ],
            R::HomeAndRetry => &[
                S::PrepareDeckForHome,
                S::RemoveTipsFromPipette,
                S::CloseDoorAndHome,
                S::ConfirmRetry,
            ],
            R::CancelRun => &[S::ConfirmCancel],
            R::RobotInMotion => &[S::InMotion],
            R::RobotResuming => &[S::Resuming],
            R::RobotRetryingStep => &[S::RetryingStep],
            R::RobotCanceling => &[S::Canceling],
            R::RobotSkippingStep => &[S::Skipping],
            R::RobotReleasingLabware => &[S::ReleasingLabware],
            R::RobotDoorOpen => &[S::DoorOpen],
            R::RobotDoorOpenSpecial => &[S::DoorOpenSpecial],
            R::ErrorWhileRecovering => &[S::RecoveryActionFailed],
        }
    }

    pub fn entry_step(self) -> RecoveryStep {
        // steps() is never empty
        self.steps().first().copied().unwrap_or(RecoveryStep::SelectRecoveryOption)
    }

    pub fn contains(self, step: RecoveryStep) -> bool {
        self.steps().contains(&step)
    }

    /// Step that follows `step`, or `None` at the last step or when `step`
    /// is not on this route.
    pub fn next_after(self, step: RecoveryStep) -> Option<RecoveryStep> {
        let steps = self.steps();
        let idx = steps.iter().position(|s| *s == step)?;
        steps.get(idx + 1).copied()
    }

    /// Step that precedes `step`, or `None` at the entry step or when
    /// `step` is not on this route.
    pub fn prev_before(self, step: RecoveryStep) -> Option<RecoveryStep> {
        let steps = self.steps();
        let idx = steps.iter().position(|s| *s == step)?;
        idx.checked_sub(1).and_then(|i| steps.get(i).copied())
    }

    pub fn is_terminal(self, step: RecoveryStep) -> bool {
        use RecoveryStep as S;
        self.contains(step)
            && matches!(
                step,
                S::ConfirmRetry
                    | S::RetryWithNewTips
                    | S::RetryWithSameTips
                    | S::SkipWithNewTips
                    | S::SkipWithSameTips
                    | S::SkipToNextStep
                    | S::ConfirmCancel
            )
    }

    /// Transient route shown while the robot acts on its own.
    pub fn is_robot_route(self) -> bool {
        use RecoveryRoute as R;
        matches!(
            self,
            R::RobotInMotion
                | R::RobotResuming
                | R::RobotRetryingStep
                | R::RobotCanceling
                | R::RobotSkippingStep
                | R::RobotReleasingLabware
                | R::RobotDoorOpen
                | R::RobotDoorOpenSpecial
        )
    }

    /// Route an operator may pick from option selection.
    pub fn is_selectable(self) -> bool {
        !self.is_robot_route()
            && !matches!(self, RecoveryRoute::OptionSelection | RecoveryRoute::ErrorWhileRecovering)
    }

    /// Where the operator handles labware by hand once the gripper has let go.
    pub fn manual_handling_step(self) -> Option<RecoveryStep> {
        match self {
            RecoveryRoute::ManualMoveAndSkip => Some(RecoveryStep::ManualMove),
            RecoveryRoute::ManualReplaceAndRetry => Some(RecoveryStep::ManualReplace),
            _ => None,
        }
    }
}

/// A `(route, step)` pair that is known to be on the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoutePosition {
    pub route: RecoveryRoute,
    pub step: RecoveryStep,
}

impl RoutePosition {
    /// Safe default every unhandled transition lands on.
    pub const OPTION_SELECTION: RoutePosition = RoutePosition {
        route: RecoveryRoute::OptionSelection,
        step: RecoveryStep::SelectRecoveryOption,
    };

    /// Entry step of `route`.
    pub fn entry(route: RecoveryRoute) -> Self {
        Self { route, step: route.entry_step() }
    }

    /// Validate `(route, step)`. `None` means the route's entry step.
    pub fn resolve(
        route: RecoveryRoute,
        step: Option<RecoveryStep>,
    ) -> Result<Self, InvalidTransition> {
        match step {
            None => Ok(Self::entry(route)),
            Some(step) if route.contains(step) => Ok(Self { route, step }),
            Some(step) => Err(InvalidTransition::StepNotOnRoute { route, step }),
        }
    }

    /// Validate a route/step given by name.
    pub fn resolve_named(route: &str, step: Option<&str>) -> Result<Self, InvalidTransition> {
        let parsed_route = RecoveryRoute::parse(route)
            .ok_or_else(|| InvalidTransition::UnknownRoute(route.to_string()))?;
        let parsed_step = match step {
            None => None,
            Some(s) => Some(
                RecoveryStep::parse(s).ok_or_else(|| InvalidTransition::UnknownStep(s.to_string()))?,
            ),
        };
        Self::resolve(parsed_route, parsed_step)
    }

    pub fn is_terminal(&self) -> bool {
        self.route.is_terminal(self.step)
    }

    pub fn door_requirement(&self) -> DoorRequirement {
        self.step.door_requirement()
    }

    /// Full metadata for this position.
    pub fn meta(&self) -> StepMeta {
        StepMeta {
            terminal: self.is_terminal(),
            door: self.door_requirement(),
            next: self.route.next_after(self.step),
            fallback: Self::OPTION_SELECTION,
        }
    }
}

impl std::fmt::Display for RoutePosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.route, self.step)
    }
}

/// Lookup result for a position on the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepMeta {
    pub terminal: bool,
    pub door: DoorRequirement,
    /// Next step on success; `None` at the end of the route.
    pub next: Option<RecoveryStep>,
    /// Destination when a selection cannot be handled.
    pub fallback: RoutePosition,
}

/// A route/step combination the graph does not know.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidTransition {
    #[error("unknown route {0:?}")]
    UnknownRoute(String),
    #[error("unknown step {0:?}")]
    UnknownStep(String),
    #[error("step {step} is not on route {route}")]
    StepNotOnRoute { route: RecoveryRoute, step: RecoveryStep },
}

#[cfg(test)]
#[path = "route_tests.rs"]
mod tests;
