// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test builders shared across this crate and its dependents.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]` via the
//! [`crate::builder`] macro, matching how the rest of the codebase family
//! exposes fixtures to downstream crates without shipping them in release
//! builds.

#![cfg(any(test, feature = "test-support"))]

use crate::document::{CancelInformation, DocumentInformation, DocumentState, DocumentType, IoConfig, ProcInfo, SchemaVersion};
use crate::ids::{CommandId, DocumentId, InstanceId, MessageId, PluginId, RunId};
use crate::plugin::{Configuration, PluginResult, PluginState, Preconditions};
use crate::status::Status;

/// A realized step configuration with deterministic ids, suitable for
/// building fixture documents.
pub fn sample_configuration(plugin_name: &str) -> Configuration {
    Configuration {
        plugin_name: plugin_name.to_string(),
        plugin_id: PluginId::from_string(format!("plg-{plugin_name}")),
        settings: serde_json::Value::Null,
        properties: serde_json::Value::Null,
        orchestration_directory: format!("/orchestration/{plugin_name}"),
        output_s3_key_prefix: format!("output/{plugin_name}"),
        preconditions: Preconditions::default(),
        is_precondition_enabled: false,
    }
}

/// A plugin step, optionally sealed with the given terminal status.
pub fn sample_plugin(plugin_name: &str, status: Option<Status>) -> PluginState {
    let mut state = PluginState::new(sample_configuration(plugin_name));
    if let Some(status) = status {
        let mut result = PluginResult::running(state.plugin_id().clone(), plugin_name, 0);
        result.status = status;
        result.end_date_time = Some(1);
        state.set_result(result).expect("fresh plugin state accepts its first result");
    }
    state
}

crate::builder! {
    pub struct DocumentStateBuilder => DocumentState {
        set {
            information: DocumentInformation = DocumentInformation {
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
            document_type: DocumentType = DocumentType::SendCommand,
            schema_version: SchemaVersion = SchemaVersion::V2_2,
            plugins: Vec<PluginState> = Vec::new(),
            cancel_information: Option<CancelInformation> = None,
            io_config: IoConfig = IoConfig {
                orchestration_directory: "/orchestration".to_string(),
                output_s3_bucket_name: String::new(),
                output_s3_key_prefix: String::new(),
                cloud_watch_log_group: None,
                cloud_watch_stream_prefix: None,
            }
        }
    }
}

#[cfg(test)]
#[path = "test_support_tests.rs"]
mod tests;
