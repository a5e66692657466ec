// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Adapter for the takeover lease record.

use crate::robot::RobotError;
use async_trait::async_trait;
use er_core::{Ownership, RunId, SessionId};

/// External record of which session drives recovery for a run.
#[async_trait]
pub trait OwnershipSource: Clone + Send + Sync + 'static {
    /// Current holder of the lease, if any.
    async fn current_owner(&self, run_id: &RunId) -> Result<Option<Ownership>, RobotError>;

    /// Write `ownership` as the lease holder. Returns the previous holder.
    async fn claim(
        &self,
        run_id: &RunId,
        ownership: Ownership,
    ) -> Result<Option<Ownership>, RobotError>;

    /// Clear the lease if `session_id` holds it.
    async fn release(&self, run_id: &RunId, session_id: &SessionId) -> Result<(), RobotError>;
}
