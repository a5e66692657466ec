// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Takeover state: which client session drives recovery for a run.

use crate::id::SessionId;
use serde::{Deserialize, Serialize};

crate::string_enum! {
    /// What the takeover notice is about.
    pub enum TakeoverIntent {
        /// Another session is recovering; this one is watching.
        Recovering => "recovering",
        /// This session asked to drive and must confirm the takeover.
        TakingOver => "taking-over",
    }
}

/// Ownership record read from the external lease channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ownership {
    pub session_id: SessionId,
    pub intent: TakeoverIntent,
}

/// Per-session view of the takeover lease.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TakeoverState {
    pub is_active_user: bool,
    pub intent: TakeoverIntent,
    pub show_takeover: bool,
}

impl Default for TakeoverState {
    fn default() -> Self {
        Self { is_active_user: false, intent: TakeoverIntent::Recovering, show_takeover: false }
    }
}

/// Result of folding a new ownership record into the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnershipChange {
    Unchanged,
    Gained,
    /// Another session took the lease from this one.
    Lost,
}

impl TakeoverState {
    /// Fold the latest ownership record in.
    ///
    /// While recovery is active and someone else holds the lease, the
    /// notice is shown with intent `recovering` unless this session is
    /// already asking to take over.
    pub fn observe_owner(
        &mut self,
        me: &SessionId,
        owner: Option<&Ownership>,
        recovery_active: bool,
    ) -> OwnershipChange {
        let was_active = self.is_active_user;
        self.is_active_user = owner.is_some_and(|o| &o.session_id == me);

        let held_by_other = owner.is_some() && !self.is_active_user;
        if self.is_active_user {
            self.show_takeover = false;
            self.intent = TakeoverIntent::Recovering;
        } else if held_by_other && recovery_active {
            if !(self.show_takeover && self.intent == TakeoverIntent::TakingOver) {
                self.intent = TakeoverIntent::Recovering;
            }
            self.show_takeover = true;
        } else if !held_by_other && self.intent == TakeoverIntent::Recovering {
            self.show_takeover = false;
        }

        match (was_active, self.is_active_user) {
            (false, true) => OwnershipChange::Gained,
            (true, false) => OwnershipChange::Lost,
            _ => OwnershipChange::Unchanged,
        }
    }

    /// A session without the lease tried to drive recovery.
    pub fn request_takeover(&mut self) {
        self.show_takeover = true;
        self.intent = TakeoverIntent::TakingOver;
    }

    /// The lease was claimed by this session.
    pub fn confirm(&mut self) {
        self.is_active_user = true;
        self.show_takeover = false;
        self.intent = TakeoverIntent::Recovering;
    }

    /// The operator backed out of the takeover prompt.
    pub fn dismiss(&mut self) {
        if self.intent == TakeoverIntent::TakingOver {
            self.show_takeover = false;
            self.intent = TakeoverIntent::Recovering;
        }
    }

    /// The lease was released by this session.
    pub fn release(&mut self) {
        self.is_active_user = false;
        self.show_takeover = false;
        self.intent = TakeoverIntent::Recovering;
    }
}

#[cfg(test)]
#[path = "takeover_tests.rs"]
mod tests;
