// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

const STEP: RecoveryStep = RecoveryStep::GripperReleaseLabware;

fn service(seconds: u32) -> (CountdownService, mpsc::Receiver<Input>) {
    let (tx, rx) = mpsc::channel(16);
    (CountdownService::new(seconds, tx), rx)
}

fn drain(rx: &mut mpsc::Receiver<Input>) -> Vec<(u64, u32)> {
    let mut ticks = Vec::new();
    while let Ok(input) = rx.try_recv() {
        if let Input::CountdownTick { generation, remaining, .. } = input {
            ticks.push((generation, remaining));
        }
    }
    ticks
}

#[tokio::test(start_paused = true)]
async fn ticks_once_per_second_down_to_zero() {
    let (svc, mut rx) = service(3);
    let state = svc.start(STEP);
    assert_eq!(state.seconds_remaining, 3);
    assert!(state.is_running);

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(drain(&mut rx), vec![(1, 2)]);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(drain(&mut rx), vec![(1, 1), (1, 0)]);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test(start_paused = true)]
async fn cancel_stops_ticks() {
    let (svc, mut rx) = service(3);
    svc.start(STEP);
    tokio::time::sleep(Duration::from_millis(1500)).await;
    svc.cancel();
    assert!(!svc.is_running());
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(drain(&mut rx), vec![(1, 2)]);
}

#[tokio::test(start_paused = true)]
async fn restart_cancels_previous_and_bumps_generation() {
    let (svc, mut rx) = service(3);
    svc.start(STEP);
    tokio::time::sleep(Duration::from_millis(1500)).await;
    let restarted = svc.start(STEP);
    assert_eq!(restarted.generation, 2);
    assert_eq!(restarted.seconds_remaining, 3);

    tokio::time::sleep(Duration::from_secs(4)).await;
    assert_eq!(drain(&mut rx), vec![(1, 2), (2, 2), (2, 1), (2, 0)]);
}

#[tokio::test(start_paused = true)]
async fn zero_duration_still_fires() {
    let (svc, mut rx) = service(0);
    let state = svc.start(STEP);
    assert_eq!(state.seconds_remaining, 1);
    assert!(state.is_running);
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(drain(&mut rx), vec![(1, 0)]);
}

#[tokio::test(start_paused = true)]
async fn finished_countdown_is_not_running() {
    let (svc, _rx) = service(1);
    svc.start(STEP);
    assert!(svc.is_running());
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(!svc.is_running());
}
