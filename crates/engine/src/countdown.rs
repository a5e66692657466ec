// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Countdown timer that delivers one tick per second into the controller.

use crate::input::Input;
use er_core::{CountdownState, RecoveryStep};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant};
use tokio_util::sync::CancellationToken;

const TICK: Duration = Duration::from_secs(1);

/// Owns at most one running countdown.
///
/// Each start bumps the generation so ticks from a cancelled countdown that
/// are already queued can be told apart and dropped by the receiver.
pub struct CountdownService {
    seconds: u32,
    input_tx: mpsc::Sender<Input>,
    current: Mutex<Option<CancellationToken>>,
    generation: AtomicU64,
}

impl CountdownService {
    /// A zero duration is treated as one second so the trigger still fires.
    pub fn new(seconds: u32, input_tx: mpsc::Sender<Input>) -> Self {
        Self {
            seconds: seconds.max(1),
            input_tx,
            current: Mutex::new(None),
            generation: AtomicU64::new(0),
        }
    }

    /// Start a fresh countdown on `step`, cancelling any running one.
    pub fn start(&self, step: RecoveryStep) -> CountdownState {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let token = CancellationToken::new();
        if let Some(previous) = self.current.lock().replace(token.clone()) {
            previous.cancel();
        }

        let tx = self.input_tx.clone();
        let seconds = self.seconds;
        tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + TICK, TICK);
            for remaining in (0..seconds).rev() {
                tokio::select! {
                    _ = token.cancelled() => return,
                    _ = interval.tick() => {}
                }
                let tick = Input::CountdownTick { step, generation, remaining };
                if tx.send(tick).await.is_err() {
                    return;
                }
            }
            token.cancel();
        });

        tracing::debug!(%step, generation, seconds, "countdown started");
        CountdownState::start(step, seconds, generation)
    }

    pub fn cancel(&self) {
        if let Some(token) = self.current.lock().take() {
            token.cancel();
            tracing::debug!("countdown cancelled");
        }
    }

    #[cfg(test)]
    pub(crate) fn is_running(&self) -> bool {
        self.current.lock().as_ref().is_some_and(|t| !t.is_cancelled())
    }
}

impl Drop for CountdownService {
    fn drop(&mut self) {
        if let Some(token) = self.current.get_mut().take() {
            token.cancel();
        }
    }
}

#[cfg(test)]
#[path = "countdown_tests.rs"]
mod tests;
