// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Enclosure door state as seen by the recovery session.

use crate::route::{DoorRequirement, RoutePosition};
use crate::run_status::RunStatus;
use serde::{Deserialize, Serialize};

/// Door state. `is_prohibited_open` depends on the current step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoorStatus {
    pub is_open: bool,
    pub is_prohibited_open: bool,
}

/// Which door notice the presentation layer should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DoorNotice {
    Standard,
    /// The gripper may still hold labware; closing the door lets it home.
    Gripper,
}

impl DoorStatus {
    /// Derive door state from the latest run status and the step the
    /// session is on. An unknown status reads as closed.
    pub fn evaluate(status: Option<RunStatus>, position: RoutePosition) -> Self {
        let is_open = status.is_some_and(RunStatus::implies_door_open);
        let requirement = position.door_requirement();
        Self { is_open, is_prohibited_open: is_open && requirement != DoorRequirement::MayBeOpen }
    }

    pub fn notice(&self, position: RoutePosition) -> Option<DoorNotice> {
        if !self.is_prohibited_open {
            return None;
        }
        match position.door_requirement() {
            DoorRequirement::Special => Some(DoorNotice::Gripper),
            DoorRequirement::MustBeClosed | DoorRequirement::MayBeOpen => Some(DoorNotice::Standard),
        }
    }
}

#[cfg(test)]
#[path = "door_tests.rs"]
mod tests;
