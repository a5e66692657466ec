// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Home-and-retry and cancel specs

use crate::prelude::*;
use similar_asserts::assert_eq;

#[tokio::test(start_paused = true)]
async fn home_and_retry_walks_to_confirm() {
    let s = Session::solo();
    s.open().await;
    s.controller.select_option(RecoveryRoute::HomeAndRetry).unwrap();
    assert_eq!(s.position().step, RecoveryStep::PrepareDeckForHome);
    s.controller.proceed_next_step().unwrap();
    s.controller.proceed_next_step().unwrap();
    assert_eq!(s.position().step, RecoveryStep::CloseDoorAndHome);

    s.controller.run_recipe(RecipeKind::HomeAndRetry).await.unwrap();
    assert_eq!(s.position(), at(RecoveryRoute::HomeAndRetry, RecoveryStep::ConfirmRetry));

    s.controller.run_recipe(RecipeKind::ResumeRun).await.unwrap();
    assert_eq!(s.position().route, RecoveryRoute::RobotRetryingStep);
    assert_eq!(
        s.robot.dispatched(),
        vec![HardwareAction::HomeExceptPlungers, HardwareAction::ResumeFromRecovery]
    );
}

#[tokio::test(start_paused = true)]
async fn home_with_door_open_waits_on_close_door_step() {
    let s = Session::solo();
    s.open().await;
    s.controller
        .proceed_to_route_and_step(RecoveryRoute::HomeAndRetry, Some(RecoveryStep::CloseDoorAndHome))
        .unwrap();
    s.status(RunStatus::AwaitingRecoveryPaused).await;

    s.controller.run_recipe(RecipeKind::HomeAndRetry).await.unwrap();
    assert!(s.robot.dispatched().is_empty());
    assert_eq!(s.position(), at(RecoveryRoute::HomeAndRetry, RecoveryStep::CloseDoorAndHome));
}

#[tokio::test(start_paused = true)]
async fn back_from_first_step_returns_to_options() {
    let s = Session::solo();
    s.open().await;
    s.controller.select_option(RecoveryRoute::HomeAndRetry).unwrap();
    let pos = s.controller.go_back_prev_step().unwrap();
    assert_eq!(pos, RoutePosition::OPTION_SELECTION);
}

#[tokio::test(start_paused = true)]
async fn cancel_stops_the_run_and_ends_the_episode() {
    let s = Session::solo();
    s.open().await;
    s.controller.select_option(RecoveryRoute::CancelRun).unwrap();
    s.controller.run_recipe(RecipeKind::CancelRun).await.unwrap();
    assert_eq!(s.robot.dispatched(), vec![HardwareAction::StopRun]);
    assert_eq!(s.position().route, RecoveryRoute::RobotCanceling);

    s.status(RunStatus::StopRequested).await;
    assert!(s.snapshot().is_er_active);
    assert_eq!(s.position().route, RecoveryRoute::RobotCanceling);

    s.status(RunStatus::Stopped).await;
    assert!(!s.snapshot().is_er_active);
    assert_eq!(s.position(), RoutePosition::OPTION_SELECTION);
}

#[tokio::test(start_paused = true)]
async fn resume_with_door_open_waits_for_the_door() {
    let s = Session::solo();
    s.open().await;
    s.controller.select_option(RecoveryRoute::RetryStep).unwrap();
    s.status(RunStatus::AwaitingRecoveryBlockedByOpenDoor).await;

    s.controller.run_recipe(RecipeKind::ResumeRun).await.unwrap();
    assert_eq!(s.position(), at(RecoveryRoute::RobotDoorOpen, RecoveryStep::DoorOpen));
    assert!(s.robot.dispatched().is_empty());

    s.status(RunStatus::AwaitingRecovery).await;
    assert_eq!(s.position(), at(RecoveryRoute::RetryStep, RecoveryStep::ConfirmRetry));

    s.controller.run_recipe(RecipeKind::ResumeRun).await.unwrap();
    assert_eq!(s.robot.dispatched(), vec![HardwareAction::ResumeFromRecovery]);
}
