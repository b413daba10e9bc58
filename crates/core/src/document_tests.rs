// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::plugin::{Configuration, PluginResult, Preconditions};

fn plugin(name: &str) -> PluginState {
    PluginState::new(Configuration {
        plugin_name: name.to_string(),
        plugin_id: PluginId::from_string(format!("plg-{name}")),
        settings: serde_json::Value::Null,
        properties: serde_json::Value::Null,
        orchestration_directory: format!("/orch/{name}"),
        output_s3_key_prefix: format!("prefix/{name}"),
        preconditions: Preconditions::default(),
        is_precondition_enabled: false,
    })
}

fn doc(plugins: Vec<PluginState>) -> DocumentState {
    DocumentState {
        information: DocumentInformation {
            document_id: DocumentId::new(),
            command_id: CommandId::new(),
            association_id: None,
            instance_id: InstanceId::new(),
            message_id: MessageId::new(),
            run_id: RunId::new(),
            created_date: 0,
            document_name: "AWS-RunShellScript".to_string(),
            document_version: "1".to_string(),
            document_status: Status::Pending,
            run_count: 0,
            proc_info: ProcInfo::default(),
        },
        document_type: DocumentType::SendCommand,
        schema_version: SchemaVersion::V2_2,
        plugins,
        cancel_information: None,
        io_config: IoConfig {
            orchestration_directory: "/orch".to_string(),
            output_s3_bucket_name: String::new(),
            output_s3_key_prefix: String::new(),
            cloud_watch_log_group: None,
            cloud_watch_stream_prefix: None,
        },
    }
}

#[test]
fn schema_version_parse_round_trip() {
    for raw in ["1.0", "1.2", "2.0", "2.0.1", "2.0.2", "2.0.3", "2.2"] {
        let parsed = SchemaVersion::parse(raw).unwrap();
        assert_eq!(parsed.as_str(), raw);
        assert_eq!(parsed.to_string(), raw);
    }
}

#[test]
fn schema_version_rejects_unknown() {
    let err = SchemaVersion::parse("3.0").unwrap_err();
    assert!(matches!(err, DocumentError::UnsupportedSchemaVersion(v) if v == "3.0"));
}

#[test]
fn legacy_runtime_config_versions() {
    assert!(SchemaVersion::V1_0.is_legacy_runtime_config());
    assert!(SchemaVersion::V1_2.is_legacy_runtime_config());
    assert!(!SchemaVersion::V2_0.is_legacy_runtime_config());
}

#[test]
fn preconditions_supported_only_at_2_2() {
    assert!(SchemaVersion::V2_2.supports_preconditions());
    assert!(!SchemaVersion::V2_0_3.supports_preconditions());
}

#[test]
fn record_result_updates_matching_plugin() {
    let mut state = doc(vec![plugin("P1"), plugin("P2")]);
    let id = state.plugins[0].plugin_id().clone();
    let mut result = PluginResult::running(id.clone(), "P1", 10);
    result.status = Status::Success;
    state.record_result(&id, result).unwrap();
    assert_eq!(state.plugin(&id).unwrap().status(), Status::Success);
}

#[test]
fn record_result_rejects_unknown_plugin_id() {
    let mut state = doc(vec![plugin("P1")]);
    let bogus = PluginId::from_string("plg-nope");
    let result = PluginResult::running(bogus.clone(), "nope", 10);
    let err = state.record_result(&bogus, result).unwrap_err();
    assert!(matches!(err, DocumentError::UnknownPlugin(_)));
}

#[test]
fn results_by_plugin_only_includes_sealed_and_unsealed_entries() {
    let mut state = doc(vec![plugin("P1"), plugin("P2")]);
    let id1 = state.plugins[0].plugin_id().clone();
    let mut result = PluginResult::running(id1.clone(), "P1", 10);
    result.status = Status::Success;
    state.record_result(&id1, result).unwrap();

    let results = state.results_by_plugin();
    assert_eq!(results.len(), 1);
    assert!(results.contains_key(&id1));
}

#[test]
fn cancel_document_without_cancel_information_is_invalid() {
    let mut state = doc(vec![]);
    state.document_type = DocumentType::CancelCommand;
    let err = state.validate_cancel_information().unwrap_err();
    assert!(matches!(err, DocumentError::MissingCancelInformation));
}

#[test]
fn cancel_document_with_cancel_information_is_valid() {
    let mut state = doc(vec![]);
    state.document_type = DocumentType::CancelCommand;
    state.cancel_information = Some(CancelInformation {
        cancel_message_id: MessageId::new(),
        cancel_command_id: CommandId::new(),
        payload: String::new(),
        debug_info: String::new(),
    });
    state.validate_cancel_information().unwrap();
}

#[test]
fn is_reboot_required_reflects_document_status() {
    let mut state = doc(vec![]);
    assert!(!state.is_reboot_required());
    state.information.document_status = Status::SuccessAndReboot;
    assert!(state.is_reboot_required());
}
