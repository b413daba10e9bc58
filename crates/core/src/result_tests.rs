// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn base() -> DocumentResult {
    DocumentResult {
        status: Status::InProgress,
        plugin_results: IndexMap::new(),
        last_plugin: Some(PluginId::from_string("plg-P1")),
        message_id: MessageId::from_string("msg-1"),
        association_id: None,
        document_name: "AWS-RunShellScript".to_string(),
        document_version: "1".to_string(),
        n_plugins: 1,
    }
}

#[test]
fn intermediate_update_is_not_final() {
    assert!(!base().is_final());
}

#[test]
fn final_update_has_no_last_plugin() {
    let mut result = base();
    result.last_plugin = None;
    result.status = Status::Success;
    assert!(result.is_final());
}

#[test]
fn serde_round_trip_preserves_plugin_results() {
    let mut result = base();
    let id = PluginId::from_string("plg-P1");
    result
        .plugin_results
        .insert(id.clone(), PluginResult::running(id.clone(), "P1", 10));

    let json = serde_json::to_string(&result).unwrap();
    let back: DocumentResult = serde_json::from_str(&json).unwrap();
    assert_eq!(back.plugin_results.len(), 1);
    assert!(back.plugin_results.contains_key(&id));
    assert_eq!(back.last_plugin, result.last_plugin);
}
