// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error recovery daemon library
//!
//! Configuration, logging and the run watcher behind the `erd` binary.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod env;
pub mod error;
pub mod logging;
pub mod watch;

pub use env::DaemonConfig;
pub use error::DaemonError;
pub use watch::{run_session, watch};
