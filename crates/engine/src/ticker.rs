// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cancellable periodic tasks.
//!
//! Every poller in the engine runs on [`spawn_ticker`]: the first tick fires
//! immediately, later ticks follow `period`, and cancelling the token drops
//! any request still in flight so its result is never delivered.

use std::future::Future;
use std::ops::ControlFlow;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

pub fn spawn_ticker<F, Fut>(
    name: &'static str,
    period: Duration,
    token: CancellationToken,
    mut tick: F,
) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ControlFlow<()>> + Send,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = interval.tick() => {}
            }
            let flow = tokio::select! {
                _ = token.cancelled() => break,
                flow = tick() => flow,
            };
            if flow.is_break() {
                break;
            }
        }
        tracing::debug!(poller = name, "ticker stopped");
    })
}

#[cfg(test)]
#[path = "ticker_tests.rs"]
mod tests;
