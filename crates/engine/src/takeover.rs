// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Takeover arbiter: decides which session may drive recovery.

use crate::error::RecoveryError;
use crate::input::Input;
use crate::state::SessionCore;
use er_adapters::{OwnershipSource, RobotError};
use er_core::{Ownership, OwnershipChange, SessionEvent, SessionId, TakeoverIntent};

#[derive(Clone)]
pub struct TakeoverArbiter<O: OwnershipSource> {
    ownership: O,
    session_id: SessionId,
    core: SessionCore,
}

impl<O: OwnershipSource> TakeoverArbiter<O> {
    pub(crate) fn new(ownership: O, session_id: SessionId, core: SessionCore) -> Self {
        Self { ownership, session_id, core }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub async fn current_owner(&self) -> Result<Option<Ownership>, RobotError> {
        self.ownership.current_owner(self.core.run_id()).await
    }

    /// Read the lease for the heartbeat, stamped with the lease generation
    /// at the start of the read.
    pub async fn read_lease(&self) -> Result<Input, RobotError> {
        let generation = self.core.read(|st| st.lease_generation);
        let owner = self.current_owner().await?;
        Ok(Input::Ownership { generation, owner })
    }

    /// Fold in a heartbeat observation of the lease. Reads that started
    /// before this session last claimed or released the lease are dropped.
    pub fn observe(&self, generation: u64, owner: Option<Ownership>) {
        let change = self.core.update(|st| {
            if generation != st.lease_generation {
                return None;
            }
            let recovery_active = st.session.is_er_active(st.run_status);
            Some(st.takeover.observe_owner(&self.session_id, owner.as_ref(), recovery_active))
        });
        let Some(change) = change else {
            tracing::debug!(run_id = %self.core.run_id(), generation, "dropping stale lease read");
            return;
        };
        match change {
            OwnershipChange::Gained => {
                tracing::info!(run_id = %self.core.run_id(), session = %self.session_id, "holding recovery lease");
            }
            OwnershipChange::Lost => {
                let new_owner = owner.map(|o| o.session_id);
                tracing::warn!(
                    run_id = %self.core.run_id(),
                    session = %self.session_id,
                    new_owner = new_owner.as_ref().map(|s| s.as_str()).unwrap_or("-"),
                    "recovery lease lost"
                );
                self.core.emit(SessionEvent::TakeoverLost { new_owner });
            }
            OwnershipChange::Unchanged => {}
        }
    }

    /// Open recovery for this session.
    ///
    /// Claims the lease when nobody holds it. When another session holds
    /// it, shows the takeover prompt and returns
    /// [`RecoveryError::TakeoverRequired`].
    pub async fn open(&self) -> Result<(), RecoveryError> {
        let owner = self.current_owner().await.map_err(RecoveryError::Ownership)?;
        match owner {
            Some(o) if o.session_id != self.session_id => {
                tracing::info!(
                    run_id = %self.core.run_id(),
                    owner = %o.session_id,
                    "recovery held by another session"
                );
                self.core.update(|st| st.takeover.request_takeover());
                Err(RecoveryError::TakeoverRequired)
            }
            Some(_) => {
                self.core.update(|st| {
                    st.lease_generation += 1;
                    st.takeover.confirm();
                });
                Ok(())
            }
            None => self.claim().await,
        }
    }

    /// Write this session as the lease holder, displacing any other.
    pub async fn claim(&self) -> Result<(), RecoveryError> {
        let record =
            Ownership { session_id: self.session_id.clone(), intent: TakeoverIntent::Recovering };
        let previous = self
            .ownership
            .claim(self.core.run_id(), record)
            .await
            .map_err(RecoveryError::Ownership)?;
        if let Some(prev) = previous.filter(|p| p.session_id != self.session_id) {
            tracing::info!(
                run_id = %self.core.run_id(),
                session = %self.session_id,
                previous = %prev.session_id,
                "took over recovery"
            );
        }
        self.core.update(|st| {
            st.lease_generation += 1;
            st.takeover.confirm();
        });
        Ok(())
    }

    pub async fn release(&self) -> Result<(), RecoveryError> {
        self.ownership
            .release(self.core.run_id(), &self.session_id)
            .await
            .map_err(RecoveryError::Ownership)?;
        self.core.update(|st| {
            st.lease_generation += 1;
            st.takeover.release();
        });
        Ok(())
    }

    pub fn dismiss(&self) {
        self.core.update(|st| st.takeover.dismiss());
    }

    /// Fail unless this session holds the lease. A refused session is
    /// shown the takeover prompt.
    pub fn ensure_active(&self) -> Result<(), RecoveryError> {
        self.core.update(|st| {
            if st.takeover.is_active_user {
                Ok(())
            } else {
                st.takeover.request_takeover();
                Err(RecoveryError::TakeoverRequired)
            }
        })
    }
}

#[cfg(test)]
#[path = "takeover_tests.rs"]
mod tests;
