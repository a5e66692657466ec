// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use er_adapters::RobotError;
use er_core::{RecipeKind, RunId};
use thiserror::Error;

/// Errors returned by recovery intents and recipes
#[derive(Debug, Error)]
pub enum RecoveryError {
    #[error("another session is driving recovery; takeover required")]
    TakeoverRequired,
    #[error("recovery is not active for run {0}")]
    Inactive(RunId),
    #[error("recipe {0} is still in flight")]
    RecipeInFlight(RecipeKind),
    #[error("hardware action failed: {0}")]
    Hardware(#[from] RobotError),
    #[error("ownership update failed: {0}")]
    Ownership(#[source] RobotError),
}
