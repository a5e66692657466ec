// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use crate::error::DaemonError;
use er_core::RunId;
use er_engine::EngineConfig;
use std::path::PathBuf;
use std::time::Duration;

/// Robot address as `host:port` (`ER_ROBOT_ADDR`, required)
pub fn robot_addr() -> Result<String, DaemonError> {
    let addr = required("ER_ROBOT_ADDR")?;
    if !addr.contains(':') {
        return Err(DaemonError::InvalidEnv { key: "ER_ROBOT_ADDR", value: addr });
    }
    Ok(addr)
}

/// Run to watch (`ER_RUN_ID`, required)
pub fn run_id() -> Result<RunId, DaemonError> {
    required("ER_RUN_ID").map(RunId::new)
}

/// Per-request HTTP timeout (default 5s, `ER_HTTP_TIMEOUT_MS`). Zero is
/// ignored.
pub fn http_timeout() -> Duration {
    std::env::var("ER_HTTP_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(5))
}

/// Resolve log directory: ER_LOG_DIR > XDG_STATE_HOME/er > ~/.local/state/er
pub fn log_dir() -> Result<PathBuf, DaemonError> {
    if let Ok(dir) = std::env::var("ER_LOG_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("er"));
    }
    let home = dirs::home_dir().ok_or(DaemonError::NoLogDir)?;
    Ok(home.join(".local/state/er"))
}

fn required(key: &'static str) -> Result<String, DaemonError> {
    std::env::var(key).ok().filter(|s| !s.is_empty()).ok_or(DaemonError::MissingEnv(key))
}

/// Everything the daemon reads at startup
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub robot_addr: String,
    pub run_id: RunId,
    pub http_timeout: Duration,
    pub log_dir: PathBuf,
    pub engine: EngineConfig,
}

impl DaemonConfig {
    pub fn from_env() -> Result<Self, DaemonError> {
        Ok(Self {
            robot_addr: robot_addr()?,
            run_id: run_id()?,
            http_timeout: http_timeout(),
            log_dir: log_dir()?,
            engine: EngineConfig::from_env(),
        })
    }
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
