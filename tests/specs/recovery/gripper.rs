// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Gripper labware recovery specs
//!
//! Manual move/replace strategies: the countdown that lets go of labware,
//! the door fork, and the route the operator lands on afterwards.

use crate::prelude::*;
use similar_asserts::assert_eq;

async fn at_release_step(s: &Session, route: RecoveryRoute) {
    s.open().await;
    s.controller.select_option(route).unwrap();
    assert_eq!(s.position(), at(route, RecoveryStep::GripperHoldingLabware));
    s.controller.proceed_next_step().unwrap();
}

/// Motion, dispatch and route events in emission order.
fn journal(events: Vec<SessionEvent>) -> Vec<String> {
    events
        .into_iter()
        .filter_map(|e| match e {
            SessionEvent::MotionRouting { in_motion } => Some(format!("motion {in_motion}")),
            SessionEvent::HardwareDispatched { action } => Some(format!("dispatch {action}")),
            SessionEvent::RouteChanged { to, .. } => Some(format!("route {to}")),
            _ => None,
        })
        .collect()
}

#[tokio::test(start_paused = true)]
async fn countdown_releases_labware_after_three_seconds() {
    let mut s = Session::solo();
    at_release_step(&s, RecoveryRoute::ManualMoveAndSkip).await;
    assert_eq!(s.snapshot().countdown_seconds_remaining(), Some(3));
    s.events();

    advance(1_050).await;
    assert_eq!(s.snapshot().countdown_seconds_remaining(), Some(2));

    advance(2_000).await;
    assert_eq!(s.robot.dispatched(), vec![HardwareAction::ReleaseGripperJaws]);
    assert_eq!(
        journal(s.events()),
        vec![
            "motion true",
            "route robot-releasing-labware/releasing-labware",
            "dispatch release-gripper-jaws",
            "motion false",
            "route manual-move-and-skip/gripper-release-labware",
            "route manual-move-and-skip/manual-move",
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn manual_move_runs_through_to_resume() {
    let s = Session::solo();
    at_release_step(&s, RecoveryRoute::ManualMoveAndSkip).await;
    advance(3_100).await;
    assert_eq!(s.position(), at(RecoveryRoute::ManualMoveAndSkip, RecoveryStep::ManualMove));

    s.controller.proceed_next_step().unwrap();
    assert!(s.snapshot().current_step == RecoveryStep::SkipToNextStep);

    s.controller.run_recipe(RecipeKind::ResumeRun).await.unwrap();
    assert_eq!(s.position().route, RecoveryRoute::RobotSkippingStep);
    assert_eq!(
        s.robot.dispatched(),
        vec![HardwareAction::ReleaseGripperJaws, HardwareAction::ResumeFromRecovery]
    );

    s.status(RunStatus::Running).await;
    let snap = s.snapshot();
    assert!(!snap.is_er_active);
    assert!(!snap.is_motion_routing);
    assert_eq!(s.position(), RoutePosition::OPTION_SELECTION);
    assert_eq!(s.board.owner(&RunId::new(RUN)), None);
}

#[tokio::test(start_paused = true)]
async fn replace_route_lands_on_manual_replace() {
    let s = Session::solo();
    at_release_step(&s, RecoveryRoute::ManualReplaceAndRetry).await;
    advance(3_100).await;
    assert_eq!(
        s.position(),
        at(RecoveryRoute::ManualReplaceAndRetry, RecoveryStep::ManualReplace)
    );
}

#[tokio::test(start_paused = true)]
async fn open_door_holds_the_countdown_and_routes_to_close_door() {
    let s = Session::solo();
    s.open().await;
    s.controller.select_option(RecoveryRoute::ManualMoveAndSkip).unwrap();
    s.status(RunStatus::AwaitingRecoveryBlockedByOpenDoor).await;
    s.controller.proceed_next_step().unwrap();

    let snap = s.snapshot();
    assert!(snap.door_status.is_open);
    assert!(snap.door_status.is_prohibited_open);
    assert_eq!(snap.countdown, None);

    advance(5_000).await;
    assert!(s.robot.dispatched().is_empty());

    s.controller.run_recipe(RecipeKind::GripperRelease).await.unwrap();
    assert!(s.robot.dispatched().is_empty());
    assert_eq!(
        s.position(),
        at(RecoveryRoute::ManualMoveAndSkip, RecoveryStep::CloseDoorGripperZHome)
    );

    s.status(RunStatus::AwaitingRecovery).await;
    s.controller.run_recipe(RecipeKind::HomeGripperZ).await.unwrap();
    assert_eq!(s.robot.dispatched(), vec![HardwareAction::HomeExceptPlungers]);
    assert_eq!(s.position(), at(RecoveryRoute::ManualMoveAndSkip, RecoveryStep::ManualMove));
}

#[tokio::test(start_paused = true)]
async fn door_opened_mid_countdown_restarts_when_closed() {
    let s = Session::solo();
    at_release_step(&s, RecoveryRoute::ManualMoveAndSkip).await;
    advance(2_500).await;

    s.status(RunStatus::AwaitingRecoveryBlockedByOpenDoor).await;
    assert_eq!(s.snapshot().countdown, None);
    advance(3_000).await;
    assert!(s.robot.dispatched().is_empty());

    s.status(RunStatus::AwaitingRecovery).await;
    assert_eq!(s.snapshot().countdown_seconds_remaining(), Some(3));
    advance(2_500).await;
    assert!(s.robot.dispatched().is_empty());
    advance(600).await;
    assert_eq!(s.robot.dispatched(), vec![HardwareAction::ReleaseGripperJaws]);
}

#[tokio::test(start_paused = true)]
async fn observer_never_runs_the_countdown() {
    let a = Session::solo();
    let b = a.peer("ses-b");
    at_release_step(&a, RecoveryRoute::ManualMoveAndSkip).await;
    b.enter().await;
    b.heartbeat().await;

    assert_eq!(b.snapshot().countdown, None);
    advance(3_100).await;
    assert_eq!(a.robot.dispatched(), vec![HardwareAction::ReleaseGripperJaws]);
}
