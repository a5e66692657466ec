// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! er-core: data model and transition functions for operator-assisted
//! error recovery of paused robot runs.

pub mod macros;

pub mod command;
pub mod countdown;
pub mod door;
pub mod event;
pub mod id;
pub mod route;
pub mod run_status;
pub mod session;
pub mod takeover;

pub use command::{CommandError, CommandLink, CommandSummary, FailedCommand};
pub use countdown::CountdownState;
pub use door::{DoorNotice, DoorStatus};
pub use event::{HardwareAction, RecipeFailure, RecipeKind, SessionEvent, SessionSnapshot};
pub use id::{short, CommandId, RunId, SessionId};
pub use route::{DoorRequirement, InvalidTransition, RecoveryRoute, RecoveryStep, RoutePosition, StepMeta};
pub use run_status::RunStatus;
pub use session::{EpisodeChange, RecoverySession};
pub use takeover::{OwnershipChange, Ownership, TakeoverIntent, TakeoverState};
