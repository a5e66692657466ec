// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Remote run status as reported by `GET /runs/{id}`.

crate::string_enum! {
    /// Status of a protocol run. Owned by the robot; clients only observe it.
    pub enum RunStatus {
        Idle => "idle",
        Running => "running",
        Paused => "paused",
        BlockedByOpenDoor => "blocked-by-open-door",
        AwaitingRecovery => "awaiting-recovery",
        AwaitingRecoveryBlockedByOpenDoor => "awaiting-recovery-blocked-by-open-door",
        AwaitingRecoveryPaused => "awaiting-recovery-paused",
        StopRequested => "stop-requested",
        Stopped => "stopped",
        Finishing => "finishing",
        Failed => "failed",
        Succeeded => "succeeded",
    }
}

impl RunStatus {
    /// The run is paused on a failed command and the robot will accept
    /// recovery commands. Only these statuses justify fetching the
    /// command the run is recovering from.
    pub fn is_recovery_eligible(self) -> bool {
        matches!(
            self,
            RunStatus::AwaitingRecovery
                | RunStatus::AwaitingRecoveryBlockedByOpenDoor
                | RunStatus::AwaitingRecoveryPaused
        )
    }

    /// Recovery-eligible statuses plus `stop-requested`, which keeps an
    /// already running recovery episode alive while the run cancels.
    pub fn is_extended_recovery_status(self) -> bool {
        self.is_recovery_eligible() || self == RunStatus::StopRequested
    }

    /// The enclosure door is open (or was opened and the run has not been
    /// resumed since).
    pub fn implies_door_open(self) -> bool {
        matches!(
            self,
            RunStatus::BlockedByOpenDoor
                | RunStatus::AwaitingRecoveryBlockedByOpenDoor
                | RunStatus::AwaitingRecoveryPaused
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RunStatus::Stopped | RunStatus::Failed | RunStatus::Succeeded)
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod strategies {
    use super::RunStatus;
    use proptest::prelude::*;

    pub fn any_run_status() -> impl Strategy<Value = RunStatus> {
        proptest::sample::select(RunStatus::ALL.to_vec())
    }

    pub fn non_eligible_status() -> impl Strategy<Value = RunStatus> {
        any_run_status().prop_filter("not recovery eligible", |s| !s.is_recovery_eligible())
    }

    pub fn extended_recovery_status() -> impl Strategy<Value = RunStatus> {
        any_run_status().prop_filter("extended recovery", |s| s.is_extended_recovery_status())
    }
}

#[cfg(test)]
#[path = "run_status_tests.rs"]
mod tests;
