// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session state shared by the controller and the executor.
//!
//! All mutation goes through [`SessionCore::update`], which re-derives the
//! door status and the countdown after the closure runs and emits one event
//! per observable change. Events are sent after the lock is released.

use crate::config::COUNTDOWN_STEP;
use crate::countdown::CountdownService;
use er_core::{
    CountdownState, DoorStatus, FailedCommand, RecipeFailure, RecipeKind, RecoverySession, RunId,
    RunStatus, SessionEvent, SessionSnapshot, TakeoverState,
};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Debug, Default)]
pub struct ControllerState {
    pub run_status: Option<RunStatus>,
    pub session: RecoverySession,
    /// Latest value reported by the status monitor.
    pub failed_command: Option<FailedCommand>,
    /// Last non-null failed command of the current episode. Survives the
    /// monitor going null while the run is stopping.
    pub retained_command: Option<FailedCommand>,
    pub context_loaded: bool,
    pub door: DoorStatus,
    pub takeover: TakeoverState,
    /// Bumped on every local lease write. Heartbeat reads started before
    /// the latest write are stale.
    pub lease_generation: u64,
    pub countdown: Option<CountdownState>,
    pub recipe_in_flight: Option<RecipeKind>,
    pub recipe_failure: Option<RecipeFailure>,
}

impl ControllerState {
    /// Session-level activity gated on a failed command and loaded context.
    pub fn is_er_active(&self) -> bool {
        self.session.is_er_active(self.run_status)
            && self.retained_command.is_some()
            && self.context_loaded
    }

    /// Whether this session may issue hardware-affecting calls.
    pub fn can_drive(&self) -> bool {
        self.is_er_active() && self.takeover.is_active_user
    }

    fn wants_countdown(&self) -> bool {
        self.can_drive()
            && self.session.position.step == COUNTDOWN_STEP
            && !self.door.is_open
            && !self.session.is_motion_routing
            && self.recipe_in_flight.is_none()
            && self.recipe_failure.is_none()
    }

    pub fn snapshot(&self, run_id: &RunId) -> SessionSnapshot {
        let pos = self.session.position;
        SessionSnapshot {
            run_id: run_id.clone(),
            run_status: self.run_status,
            is_er_active: self.is_er_active(),
            current_route: pos.route,
            current_step: pos.step,
            step_meta: pos.meta(),
            selected_route: self.session.selected_route,
            is_motion_routing: self.session.is_motion_routing,
            failed_command: self.failed_command.clone(),
            door_status: self.door,
            door_notice: self.door.notice(pos),
            takeover_state: self.takeover,
            countdown: self.countdown,
            recipe_in_flight: self.recipe_in_flight,
            recipe_failure: self.recipe_failure.clone(),
        }
    }
}

/// Observable fields compared before and after an update.
struct Observed {
    active: bool,
    command_id: Option<er_core::CommandId>,
    in_motion: bool,
    position: er_core::RoutePosition,
    door: DoorStatus,
    countdown: Option<CountdownState>,
    takeover: TakeoverState,
}

impl Observed {
    fn of(st: &ControllerState) -> Self {
        Self {
            active: st.is_er_active(),
            command_id: st.failed_command.as_ref().map(|c| c.id.clone()),
            in_motion: st.session.is_motion_routing,
            position: st.session.position,
            door: st.door,
            countdown: st.countdown,
            takeover: st.takeover,
        }
    }

    fn diff(&self, after: &Observed, events: &mut Vec<SessionEvent>) {
        if self.active != after.active {
            events.push(SessionEvent::ActivityChanged { active: after.active });
        }
        if self.command_id != after.command_id {
            events.push(SessionEvent::FailedCommandChanged { command_id: after.command_id.clone() });
        }
        if self.in_motion != after.in_motion {
            events.push(SessionEvent::MotionRouting { in_motion: after.in_motion });
        }
        if self.position != after.position {
            events.push(SessionEvent::RouteChanged { from: self.position, to: after.position });
        }
        if self.door != after.door {
            events.push(SessionEvent::DoorChanged { status: after.door });
        }
        if let Some(c) = after.countdown {
            if self.countdown != after.countdown {
                events.push(SessionEvent::CountdownTick {
                    step: c.step,
                    seconds_remaining: c.seconds_remaining,
                });
            }
        }
        if self.takeover != after.takeover {
            events.push(SessionEvent::TakeoverChanged { state: after.takeover });
        }
    }
}

struct Inner {
    run_id: RunId,
    state: Mutex<ControllerState>,
    events: mpsc::UnboundedSender<SessionEvent>,
    countdown: CountdownService,
}

#[derive(Clone)]
pub struct SessionCore {
    inner: Arc<Inner>,
}

impl SessionCore {
    pub fn new(
        run_id: RunId,
        countdown: CountdownService,
        events: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                run_id,
                state: Mutex::new(ControllerState::default()),
                events,
                countdown,
            }),
        }
    }

    pub fn run_id(&self) -> &RunId {
        &self.inner.run_id
    }

    pub fn read<T>(&self, f: impl FnOnce(&ControllerState) -> T) -> T {
        f(&self.inner.state.lock())
    }

    /// Apply `f`, reconcile derived state, then emit the resulting events.
    pub fn update<T>(&self, f: impl FnOnce(&mut ControllerState) -> T) -> T {
        let mut events = Vec::new();
        let result = {
            let mut st = self.inner.state.lock();
            let before = Observed::of(&st);
            let result = f(&mut st);
            self.reconcile(&mut st);
            before.diff(&Observed::of(&st), &mut events);
            result
        };
        for event in events {
            self.emit(event);
        }
        result
    }

    pub fn emit(&self, event: SessionEvent) {
        tracing::debug!(run_id = %self.inner.run_id, event = %event, "session event");
        // A closed receiver only means nobody is listening any more.
        let _ = self.inner.events.send(event);
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.read(|st| st.snapshot(&self.inner.run_id))
    }

    pub fn countdown(&self) -> &CountdownService {
        &self.inner.countdown
    }

    fn reconcile(&self, st: &mut ControllerState) {
        st.door = DoorStatus::evaluate(st.run_status, st.session.position);
        if !st.door.is_open && st.session.leave_door_park() {
            tracing::info!(run_id = %self.inner.run_id, position = %st.session.position, "door closed; leaving door screen");
            st.door = DoorStatus::evaluate(st.run_status, st.session.position);
        }

        if let Some(c) = st.countdown {
            if c.step != st.session.position.step || !st.wants_countdown() {
                self.inner.countdown.cancel();
                st.countdown = None;
            }
        }
        if st.countdown.is_none() && st.wants_countdown() {
            st.countdown = Some(self.inner.countdown.start(st.session.position.step));
        }
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
