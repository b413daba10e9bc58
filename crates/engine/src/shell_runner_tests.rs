// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use doc_core::test_support::DocumentStateBuilder;
use doc_core::{CancelFlag, PluginId, PluginState, Status};
use serde_json::json;

use super::*;

// Mirrors what `v2_steps` actually produces from a `mainSteps` entry's
// `inputs` block: the command lives in `properties`, not `settings`.
fn plugin_with_command(name: &str, orchestration_dir: &std::path::Path, command: &str) -> PluginState {
    PluginState::new(doc_core::Configuration {
        plugin_name: name.to_string(),
        plugin_id: PluginId::from_string(format!("plg-{name}")),
        settings: serde_json::Value::Null,
        properties: json!({ "command": command }),
        orchestration_directory: orchestration_dir.join(name).to_string_lossy().into_owned(),
        output_s3_key_prefix: format!("output/{name}"),
        preconditions: doc_core::Preconditions::default(),
        is_precondition_enabled: false,
    })
}

fn plugin_with_command_in_settings(name: &str, orchestration_dir: &std::path::Path, command: &str) -> PluginState {
    PluginState::new(doc_core::Configuration {
        plugin_name: name.to_string(),
        plugin_id: PluginId::from_string(format!("plg-{name}")),
        settings: json!({ "command": command }),
        properties: serde_json::Value::Null,
        orchestration_directory: orchestration_dir.join(name).to_string_lossy().into_owned(),
        output_s3_key_prefix: format!("output/{name}"),
        preconditions: doc_core::Preconditions::default(),
        is_precondition_enabled: false,
    })
}

async fn recv_with_timeout(rx: &mut mpsc::Receiver<PluginResult>) -> PluginResult {
    tokio::time::timeout(Duration::from_secs(5), rx.recv()).await.unwrap().unwrap()
}

#[tokio::test]
async fn a_successful_command_reports_success_and_captures_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let document = DocumentStateBuilder::default()
        .plugins(vec![plugin_with_command("p1", dir.path(), "echo hello")])
        .build();

    let runner = ShellPluginRunner::new();
    let (tx, mut rx) = mpsc::channel(4);
    runner.run(&document, tx, CancelFlag::new().observer()).await.unwrap();

    let result = recv_with_timeout(&mut rx).await;
    assert_eq!(result.status, Status::Success);
    assert_eq!(result.code, 0);
    assert_eq!(result.standard_output.trim(), "hello");
    assert!(rx.recv().await.is_none());
}

#[tokio::test]
async fn a_failing_command_reports_failed_with_its_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    let document = DocumentStateBuilder::default()
        .plugins(vec![plugin_with_command("p1", dir.path(), "exit 7")])
        .build();

    let runner = ShellPluginRunner::new();
    let (tx, mut rx) = mpsc::channel(4);
    runner.run(&document, tx, CancelFlag::new().observer()).await.unwrap();

    let result = recv_with_timeout(&mut rx).await;
    assert_eq!(result.status, Status::Failed);
    assert_eq!(result.code, 7);
    assert!(result.error.is_some());
}

#[tokio::test]
async fn a_missing_command_field_is_reported_failed_without_spawning_a_shell() {
    let dir = tempfile::tempdir().unwrap();
    let mut plugin = plugin_with_command("p1", dir.path(), "echo unused");
    plugin.configuration.properties = serde_json::Value::Null;
    let document = DocumentStateBuilder::default().plugins(vec![plugin]).build();

    let runner = ShellPluginRunner::new();
    let (tx, mut rx) = mpsc::channel(4);
    runner.run(&document, tx, CancelFlag::new().observer()).await.unwrap();

    let result = recv_with_timeout(&mut rx).await;
    assert_eq!(result.status, Status::Failed);
    assert!(result.error.unwrap().contains("properties.command"));
}

#[tokio::test]
async fn a_command_supplied_via_settings_is_also_honored() {
    let dir = tempfile::tempdir().unwrap();
    let document = DocumentStateBuilder::default()
        .plugins(vec![plugin_with_command_in_settings("p1", dir.path(), "echo via-settings")])
        .build();

    let runner = ShellPluginRunner::new();
    let (tx, mut rx) = mpsc::channel(4);
    runner.run(&document, tx, CancelFlag::new().observer()).await.unwrap();

    let result = recv_with_timeout(&mut rx).await;
    assert_eq!(result.status, Status::Success);
    assert_eq!(result.standard_output.trim(), "via-settings");
}

#[tokio::test]
async fn a_cancelled_run_reports_every_remaining_step_as_cancelled_without_running_it() {
    let dir = tempfile::tempdir().unwrap();
    let document = DocumentStateBuilder::default()
        .plugins(vec![
            plugin_with_command("p1", dir.path(), "echo should-not-run"),
            plugin_with_command("p2", dir.path(), "echo should-not-run"),
        ])
        .build();

    let cancel = CancelFlag::new();
    cancel.cancel();

    let runner = ShellPluginRunner::new();
    let (tx, mut rx) = mpsc::channel(4);
    runner.run(&document, tx, cancel.observer()).await.unwrap();

    let first = recv_with_timeout(&mut rx).await;
    assert_eq!(first.status, Status::Cancelled);
    let second = recv_with_timeout(&mut rx).await;
    assert_eq!(second.status, Status::Cancelled);
    assert!(rx.recv().await.is_none());
}

#[tokio::test]
async fn output_is_also_written_to_the_orchestration_directory() {
    let dir = tempfile::tempdir().unwrap();
    let document = DocumentStateBuilder::default()
        .plugins(vec![plugin_with_command("p1", dir.path(), "echo from-stdout 1>&2")])
        .build();

    let runner = ShellPluginRunner::new();
    let (tx, mut rx) = mpsc::channel(4);
    runner.run(&document, tx, CancelFlag::new().observer()).await.unwrap();
    let result = recv_with_timeout(&mut rx).await;
    assert_eq!(result.status, Status::Success);

    let stderr_path = dir.path().join("p1").join("stderr");
    let captured = tokio::fs::read_to_string(stderr_path).await.unwrap();
    assert_eq!(captured.trim(), "from-stdout");
}
