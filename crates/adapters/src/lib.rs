// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! er-adapters: the robot control API and the takeover lease channel.

pub mod client;
pub mod http;
pub mod ownership;
pub mod robot;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
pub mod fake;

pub use client::HttpRobotClient;
pub use ownership::OwnershipSource;
pub use robot::{RobotClient, RobotError};

#[cfg(any(test, feature = "test-support"))]
pub use fake::{failed_command, FakeOwnership, FakeRobotClient, RobotCall};
