// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn owned_by(id: &SessionId) -> Ownership {
    Ownership { session_id: id.clone(), intent: TakeoverIntent::Recovering }
}

#[test]
fn default_is_passive_without_notice() {
    let state = TakeoverState::default();
    assert!(!state.is_active_user);
    assert!(!state.show_takeover);
}

#[test]
fn observing_own_lease_gains_control() {
    let me = SessionId::new("ses-me");
    let mut state = TakeoverState::default();
    let change = state.observe_owner(&me, Some(&owned_by(&me)), true);
    assert_eq!(change, OwnershipChange::Gained);
    assert!(state.is_active_user);
    assert!(!state.show_takeover);
}

#[test]
fn other_owner_during_recovery_shows_recovering_notice() {
    let me = SessionId::new("ses-me");
    let other = SessionId::new("ses-other");
    let mut state = TakeoverState::default();
    let change = state.observe_owner(&me, Some(&owned_by(&other)), true);
    assert_eq!(change, OwnershipChange::Unchanged);
    assert!(state.show_takeover);
    assert_eq!(state.intent, TakeoverIntent::Recovering);
}

#[test]
fn other_owner_outside_recovery_stays_quiet() {
    let me = SessionId::new("ses-me");
    let other = SessionId::new("ses-other");
    let mut state = TakeoverState::default();
    state.observe_owner(&me, Some(&owned_by(&other)), false);
    assert!(!state.show_takeover);
}

#[test]
fn losing_the_lease_is_reported() {
    let me = SessionId::new("ses-me");
    let other = SessionId::new("ses-other");
    let mut state = TakeoverState::default();
    state.confirm();
    let change = state.observe_owner(&me, Some(&owned_by(&other)), true);
    assert_eq!(change, OwnershipChange::Lost);
    assert!(!state.is_active_user);
    assert!(state.show_takeover);
}

#[test]
fn pending_takeover_keeps_its_intent_across_heartbeats() {
    let me = SessionId::new("ses-me");
    let other = SessionId::new("ses-other");
    let mut state = TakeoverState::default();
    state.request_takeover();
    state.observe_owner(&me, Some(&owned_by(&other)), true);
    assert_eq!(state.intent, TakeoverIntent::TakingOver);
    assert!(state.show_takeover);

    state.dismiss();
    assert!(!state.show_takeover);
    assert_eq!(state.intent, TakeoverIntent::Recovering);
}

#[test]
fn lease_released_by_other_clears_recovering_notice() {
    let me = SessionId::new("ses-me");
    let other = SessionId::new("ses-other");
    let mut state = TakeoverState::default();
    state.observe_owner(&me, Some(&owned_by(&other)), true);
    assert!(state.show_takeover);
    state.observe_owner(&me, None, true);
    assert!(!state.show_takeover);
}
