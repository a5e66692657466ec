// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Multi-client takeover specs

use crate::prelude::*;
use similar_asserts::assert_eq;

#[tokio::test(start_paused = true)]
async fn second_client_sees_recovery_in_progress() {
    let a = Session::solo();
    let b = a.peer("ses-b");
    a.open().await;
    b.enter().await;
    b.heartbeat().await;

    let state = b.snapshot().takeover_state;
    assert!(!state.is_active_user);
    assert!(state.show_takeover);
    assert_eq!(state.intent, TakeoverIntent::Recovering);
}

#[tokio::test(start_paused = true)]
async fn takeover_requires_confirmation_and_notifies_owner() {
    let mut a = Session::solo();
    let b = a.peer("ses-b");
    a.open().await;
    a.controller.select_option(RecoveryRoute::RetryStep).unwrap();
    b.enter().await;

    assert!(matches!(
        b.controller.toggle_recovery(true).await,
        Err(RecoveryError::TakeoverRequired)
    ));
    assert_eq!(b.snapshot().takeover_state.intent, TakeoverIntent::TakingOver);
    assert_eq!(
        a.board.owner(&RunId::new(RUN)).map(|o| o.session_id),
        Some(SessionId::new("ses-a"))
    );

    b.controller.confirm_takeover().await.unwrap();
    assert!(b.snapshot().takeover_state.is_active_user);

    a.events();
    a.heartbeat().await;
    assert!(a
        .events()
        .contains(&SessionEvent::TakeoverLost { new_owner: Some(SessionId::new("ses-b")) }));
    assert!(matches!(
        a.controller.run_recipe(RecipeKind::ResumeRun).await,
        Err(RecoveryError::TakeoverRequired)
    ));

    b.controller.select_option(RecoveryRoute::RetryStep).unwrap();
    b.controller.run_recipe(RecipeKind::ResumeRun).await.unwrap();
    assert_eq!(b.robot.dispatched(), vec![HardwareAction::ResumeFromRecovery]);
}

#[tokio::test(start_paused = true)]
async fn dismissing_the_prompt_keeps_observing() {
    let a = Session::solo();
    let b = a.peer("ses-b");
    a.open().await;
    b.enter().await;
    let _ = b.controller.toggle_recovery(true).await;

    b.controller.dismiss_takeover();
    let state = b.snapshot().takeover_state;
    assert!(!state.show_takeover);
    assert!(!state.is_active_user);
    assert_eq!(a.board.owner(&RunId::new(RUN)).map(|o| o.session_id), Some(SessionId::new("ses-a")));
}

#[tokio::test(start_paused = true)]
async fn closing_recovery_frees_the_lease_for_others() {
    let a = Session::solo();
    let b = a.peer("ses-b");
    a.open().await;
    a.controller.toggle_recovery(false).await.unwrap();

    b.enter().await;
    b.controller.toggle_recovery(true).await.unwrap();
    assert!(b.snapshot().takeover_state.is_active_user);
}
