// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Countdown gating a fallback action.

use crate::route::RecoveryStep;
use serde::{Deserialize, Serialize};

/// Remaining time of a countdown bound to one step.
///
/// `generation` distinguishes restarts on the same step so a tick from a
/// cancelled timer can be told apart from the live one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountdownState {
    pub step: RecoveryStep,
    pub seconds_remaining: u32,
    pub is_running: bool,
    pub generation: u64,
}

impl CountdownState {
    pub fn start(step: RecoveryStep, seconds: u32, generation: u64) -> Self {
        Self { step, seconds_remaining: seconds, is_running: seconds > 0, generation }
    }

    /// Whether a tick for `(step, generation)` belongs to this countdown.
    pub fn accepts(&self, step: RecoveryStep, generation: u64) -> bool {
        self.is_running && self.step == step && self.generation == generation
    }

    /// Apply a tick reporting `remaining` seconds. Returns true once the
    /// countdown reaches zero.
    pub fn tick(&mut self, remaining: u32) -> bool {
        self.seconds_remaining = remaining.min(self.seconds_remaining);
        if self.seconds_remaining == 0 {
            self.is_running = false;
        }
        !self.is_running
    }
}

#[cfg(test)]
#[path = "countdown_tests.rs"]
mod tests;
