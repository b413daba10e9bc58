// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

#[tokio::test]
#[serial]
async fn spawn_and_wait_reaps_a_short_lived_process() {
    let adapter = StdProcessAdapter::default();
    let mut handle = adapter.spawn("true", &[]).await.unwrap();
    assert!(handle.proc_info().pid > 0);
    adapter.wait(&mut handle).await.unwrap();
}

#[tokio::test]
#[serial]
async fn find_by_pid_and_start_time_matches_a_running_process() {
    let adapter = StdProcessAdapter::default();
    let mut handle = adapter.spawn("sleep", &["0.3".to_string()]).await.unwrap();
    let info = handle.proc_info();

    assert!(adapter.find_by_pid_and_start_time(info.pid, info.start_time));
    adapter.wait(&mut handle).await.unwrap();
}

#[tokio::test]
#[serial]
async fn find_by_pid_and_start_time_rejects_a_mismatched_start_time() {
    let adapter = StdProcessAdapter::default();
    let mut handle = adapter.spawn("sleep", &["0.3".to_string()]).await.unwrap();
    let info = handle.proc_info();

    assert!(!adapter.find_by_pid_and_start_time(info.pid, info.start_time + 10_000));
    adapter.wait(&mut handle).await.unwrap();
}

#[test]
fn find_by_pid_and_start_time_returns_false_for_an_unused_pid() {
    let adapter = StdProcessAdapter::default();
    // Pid 0 is never a user process on Unix.
    assert!(!adapter.find_by_pid_and_start_time(0, 0));
}

#[tokio::test]
#[serial]
async fn wait_tolerates_a_process_already_reaped() {
    let adapter = StdProcessAdapter::default();
    let mut handle = adapter.spawn("true", &[]).await.unwrap();
    adapter.wait(&mut handle).await.unwrap();
    // A second wait on an already-reaped child must not be treated as fatal.
    adapter.wait(&mut handle).await.unwrap();
}
