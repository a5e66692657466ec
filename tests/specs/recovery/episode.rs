// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recovery episode specs
//!
//! When recovery is considered active and what survives between episodes.

use crate::prelude::*;
use similar_asserts::assert_eq;

#[tokio::test(start_paused = true)]
async fn activity_follows_the_episode() {
    let s = Session::solo();
    s.status(RunStatus::Running).await;
    assert!(!s.snapshot().is_er_active);

    s.enter().await;
    assert!(s.snapshot().is_er_active);

    s.status(RunStatus::AwaitingRecoveryPaused).await;
    assert!(s.snapshot().is_er_active);

    s.status(RunStatus::StopRequested).await;
    let snap = s.snapshot();
    assert!(snap.is_er_active, "stop-requested keeps recovery up mid-episode");
    assert_eq!(snap.failed_command, None);

    s.status(RunStatus::Stopped).await;
    assert!(!s.snapshot().is_er_active);
}

#[tokio::test(start_paused = true)]
async fn history_view_of_stopping_run_is_not_recovery() {
    let s = Session::solo();
    s.controller.set_context_loaded(true);
    s.status(RunStatus::StopRequested).await;
    assert!(!s.snapshot().is_er_active);
    assert!(!s.robot.calls().iter().any(|c| matches!(c, RobotCall::CommandSummary(_))));
}

#[tokio::test(start_paused = true)]
async fn failed_command_polls_every_five_seconds() {
    let s = Session::solo();
    s.enter().await;
    advance(15_000).await;

    let summaries = s
        .robot
        .calls()
        .iter()
        .filter(|c| matches!(c, RobotCall::CommandSummary(_)))
        .count();
    assert_eq!(summaries, 4);

    s.status(RunStatus::Running).await;
    let before = s.robot.query_count();
    advance(20_000).await;
    assert_eq!(s.robot.query_count(), before);
}

#[tokio::test(start_paused = true)]
async fn each_episode_starts_from_option_selection() {
    let mut s = Session::solo();
    s.open().await;
    s.controller.select_option(RecoveryRoute::RetrySameTips).unwrap();
    s.status(RunStatus::Running).await;

    s.robot.set_failed_command(failed_command("cmd-2", "aspirate"));
    s.events();
    s.enter().await;

    let snap = s.snapshot();
    assert_eq!(snap.selected_route, None);
    assert_eq!(s.position(), RoutePosition::OPTION_SELECTION);
    assert_eq!(snap.failed_command.map(|c| c.command_type), Some("aspirate".to_string()));
    assert!(s.events().contains(&SessionEvent::ActivityChanged { active: true }));
}

#[tokio::test(start_paused = true)]
async fn snapshot_serializes_for_presentation() {
    let s = Session::solo();
    s.enter().await;
    let json = serde_json::to_value(s.snapshot()).unwrap();
    assert_eq!(json["isERActive"], serde_json::json!(true));
    assert_eq!(json["currentRoute"], serde_json::json!("option-selection"));
    assert_eq!(json["runStatus"], serde_json::json!("awaiting-recovery"));
    assert_eq!(json["failedCommand"]["id"], serde_json::json!("cmd-1"));
}
