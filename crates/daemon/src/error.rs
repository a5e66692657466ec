// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use er_adapters::RobotError;
use thiserror::Error;

/// Errors that stop the daemon
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("missing required environment variable {0}")]
    MissingEnv(&'static str),
    #[error("invalid value for {key}: {value}")]
    InvalidEnv { key: &'static str, value: String },
    #[error("could not determine log directory")]
    NoLogDir,
    #[error("logging setup failed: {0}")]
    Logging(String),
    #[error("robot unreachable: {0}")]
    Robot(#[from] RobotError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
