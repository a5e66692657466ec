// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Failure handling specs
//!
//! Hardware failures surface and wait for the operator; poll failures and
//! invalid transitions are absorbed.

use crate::prelude::*;
use similar_asserts::assert_eq;

#[tokio::test(start_paused = true)]
async fn hardware_failure_is_surfaced_not_retried() {
    let mut s = Session::solo();
    s.open().await;
    s.controller
        .proceed_to_route_and_step(
            RecoveryRoute::ManualReplaceAndRetry,
            Some(RecoveryStep::CloseDoorGripperZHome),
        )
        .unwrap();
    s.robot.fail_action(HardwareAction::HomeExceptPlungers, "z axis stalled");
    s.events();

    let err = s.controller.run_recipe(RecipeKind::HomeGripperZ).await.unwrap_err();
    assert!(matches!(err, RecoveryError::Hardware(_)));

    let snap = s.snapshot();
    assert_eq!(
        s.position(),
        at(RecoveryRoute::ErrorWhileRecovering, RecoveryStep::RecoveryActionFailed)
    );
    assert!(!snap.is_motion_routing);
    assert_eq!(snap.recipe_in_flight, None);
    assert!(snap.recipe_failure.unwrap().reason.contains("z axis stalled"));
    assert!(s
        .events()
        .iter()
        .any(|e| matches!(e, SessionEvent::RecipeFailed { recipe: RecipeKind::HomeGripperZ, .. })));

    advance(10_000).await;
    assert_eq!(s.robot.dispatched(), vec![HardwareAction::HomeExceptPlungers]);

    s.controller.acknowledge_failure().unwrap();
    assert_eq!(s.position(), RoutePosition::OPTION_SELECTION);
}

#[tokio::test(start_paused = true)]
async fn overlapping_recipes_are_rejected() {
    let s = Session::solo();
    s.open().await;
    s.controller
        .proceed_to_route_and_step(RecoveryRoute::HomeAndRetry, Some(RecoveryStep::CloseDoorAndHome))
        .unwrap();
    s.robot.hold_dispatch();

    let controller = s.controller.clone();
    let first = tokio::spawn(async move { controller.run_recipe(RecipeKind::HomeAndRetry).await });
    settle().await;
    assert_eq!(s.snapshot().recipe_in_flight, Some(RecipeKind::HomeAndRetry));

    let err = s.controller.run_recipe(RecipeKind::ResumeRun).await.unwrap_err();
    assert!(matches!(err, RecoveryError::RecipeInFlight(RecipeKind::HomeAndRetry)));

    s.robot.release_dispatch(1);
    first.await.unwrap().unwrap();
    assert_eq!(s.robot.dispatched(), vec![HardwareAction::HomeExceptPlungers]);
}

#[tokio::test(start_paused = true)]
async fn poll_failures_keep_the_last_known_command() {
    let s = Session::solo();
    s.enter().await;
    s.robot.fail_queries(true);
    advance(12_000).await;

    let snap = s.snapshot();
    assert!(snap.is_er_active);
    assert_eq!(snap.failed_command.map(|c| c.id.to_string()), Some("cmd-1".to_string()));
}

#[tokio::test(start_paused = true)]
async fn result_arriving_after_recovery_ends_is_ignored() {
    let s = Session::solo();
    s.robot.hold_detail();
    s.status(RunStatus::AwaitingRecovery).await;
    s.status(RunStatus::Running).await;
    s.robot.release_detail(1);
    settle().await;

    assert_eq!(s.snapshot().failed_command, None);
    assert!(!s.snapshot().is_er_active);
}

#[tokio::test(start_paused = true)]
async fn unknown_route_names_fall_back() {
    let s = Session::solo();
    s.open().await;
    s.controller.select_option(RecoveryRoute::RetryNewTips).unwrap();
    let pos = s.controller.proceed_to_named("no-such-route", None).unwrap();
    assert_eq!(pos, RoutePosition::OPTION_SELECTION);

    let pos = s.controller.select_option(RecoveryRoute::RobotInMotion).unwrap();
    assert_eq!(pos, RoutePosition::OPTION_SELECTION);
}

#[tokio::test(start_paused = true)]
async fn intents_need_an_active_recovery() {
    let s = Session::solo();
    s.status(RunStatus::Running).await;
    assert!(matches!(
        s.controller.select_option(RecoveryRoute::RetryStep),
        Err(RecoveryError::Inactive(_))
    ));
    assert!(matches!(
        s.controller.toggle_recovery(true).await,
        Err(RecoveryError::Inactive(_))
    ));
}
