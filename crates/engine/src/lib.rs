// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! er-engine: status monitoring, hardware recipes, countdowns and takeover
//! arbitration for a single run's recovery session.

pub mod config;
pub mod controller;
pub mod countdown;
pub mod error;
mod executor;
pub mod input;
pub mod monitor;
mod state;
pub mod takeover;
mod ticker;

pub use config::EngineConfig;
pub use controller::{ControllerDeps, RecoveryController};
pub use countdown::CountdownService;
pub use error::RecoveryError;
pub use input::Input;
pub use monitor::RecoveryStatusMonitor;
pub use takeover::TakeoverArbiter;
