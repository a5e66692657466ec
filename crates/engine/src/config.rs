// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine timing configuration with environment overrides.

use std::time::Duration;

/// Poll interval for the command summary and run status.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Grace period before the gripper lets go of labware on its own.
pub const DEFAULT_COUNTDOWN_SECS: u32 = 3;

/// Ownership heartbeat interval.
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);

/// Step that arms the gripper-release countdown.
pub const COUNTDOWN_STEP: er_core::RecoveryStep = er_core::RecoveryStep::GripperReleaseLabware;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub poll_interval: Duration,
    pub countdown_secs: u32,
    /// Page length of the command summary. Zero asks for links only.
    pub page_length: u32,
    pub heartbeat_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            countdown_secs: DEFAULT_COUNTDOWN_SECS,
            page_length: 0,
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `ER_POLL_INTERVAL_MS`, `ER_COUNTDOWN_SECS`
    /// and `ER_HEARTBEAT_MS`. Unparseable values are ignored.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            poll_interval: env_ms("ER_POLL_INTERVAL_MS").unwrap_or(defaults.poll_interval),
            countdown_secs: std::env::var("ER_COUNTDOWN_SECS")
                .ok()
                .and_then(|s| s.parse::<u32>().ok())
                .unwrap_or(defaults.countdown_secs),
            page_length: defaults.page_length,
            heartbeat_interval: env_ms("ER_HEARTBEAT_MS").unwrap_or(defaults.heartbeat_interval),
        }
    }
}

fn env_ms(key: &str) -> Option<Duration> {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
