// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inputs fed into the controller loop by pollers and timers.

use er_core::{FailedCommand, Ownership, RecoveryStep, RunStatus};

#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    /// Latest run status from the status poller.
    RunStatus(RunStatus),
    /// A completed two-step lookup for the given monitor episode.
    FailedCommand { episode: u64, command: Option<FailedCommand> },
    /// One countdown second elapsed. `remaining == 0` fires the recipe.
    CountdownTick { step: RecoveryStep, generation: u64, remaining: u32 },
    /// Lease holder read by the ownership heartbeat, stamped with the lease
    /// generation current when the read started.
    Ownership { generation: u64, owner: Option<Ownership> },
    /// Run-scoped context became available (or was lost).
    ContextLoaded(bool),
}

er_core::simple_display! {
    Input {
        RunStatus(..) => "run_status",
        FailedCommand { .. } => "failed_command",
        CountdownTick { .. } => "countdown_tick",
        Ownership { .. } => "ownership",
        ContextLoaded(..) => "context_loaded",
    }
}
