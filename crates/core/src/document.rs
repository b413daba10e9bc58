// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Document-level state: the persistent unit of work tracked across a run.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::DocumentError;
use crate::ids::{AssociationId, CommandId, DocumentId, InstanceId, MessageId, PluginId, RunId};
use crate::plugin::PluginState;
use crate::status::Status;

/// `{Pid, StartTime}` used to identify a previously-spawned worker across a
/// master restart. A pid alone is never authoritative; pids are reused.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcInfo {
    pub pid: u32,
    pub start_time: u64,
}

impl ProcInfo {
    pub fn new(pid: u32, start_time: u64) -> Self {
        Self { pid, start_time }
    }

    pub fn is_set(&self) -> bool {
        self.pid != 0
    }
}

/// Kinds of document a master can be asked to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum DocumentType {
    SendCommand,
    CancelCommand,
    Association,
    StartSession,
    SendCommandOffline,
    CancelCommandOffline,
}

impl DocumentType {
    /// Whether this document type carries [`CancelInformation`].
    pub fn is_cancel(&self) -> bool {
        matches!(self, DocumentType::CancelCommand | DocumentType::CancelCommandOffline)
    }
}

crate::simple_display! {
    DocumentType {
        SendCommand => "SendCommand",
        CancelCommand => "CancelCommand",
        Association => "Association",
        StartSession => "StartSession",
        SendCommandOffline => "SendCommandOffline",
        CancelCommandOffline => "CancelCommandOffline",
    }
}

/// The set of document schema versions this core understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchemaVersion {
    #[serde(rename = "1.0")]
    V1_0,
    #[serde(rename = "1.2")]
    V1_2,
    #[serde(rename = "2.0")]
    V2_0,
    #[serde(rename = "2.0.1")]
    V2_0_1,
    #[serde(rename = "2.0.2")]
    V2_0_2,
    #[serde(rename = "2.0.3")]
    V2_0_3,
    #[serde(rename = "2.2")]
    V2_2,
}

impl SchemaVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaVersion::V1_0 => "1.0",
            SchemaVersion::V1_2 => "1.2",
            SchemaVersion::V2_0 => "2.0",
            SchemaVersion::V2_0_1 => "2.0.1",
            SchemaVersion::V2_0_2 => "2.0.2",
            SchemaVersion::V2_0_3 => "2.0.3",
            SchemaVersion::V2_2 => "2.2",
        }
    }

    /// `runtimeConfig`-style documents (pre-mainSteps).
    pub fn is_legacy_runtime_config(&self) -> bool {
        matches!(self, SchemaVersion::V1_0 | SchemaVersion::V1_2)
    }

    /// `schemaVersion >= "2.2"`, the cutoff at which preconditions apply.
    pub fn supports_preconditions(&self) -> bool {
        matches!(self, SchemaVersion::V2_2)
    }

    pub fn parse(raw: &str) -> Result<Self, DocumentError> {
        match raw {
            "1.0" => Ok(SchemaVersion::V1_0),
            "1.2" => Ok(SchemaVersion::V1_2),
            "2.0" => Ok(SchemaVersion::V2_0),
            "2.0.1" => Ok(SchemaVersion::V2_0_1),
            "2.0.2" => Ok(SchemaVersion::V2_0_2),
            "2.0.3" => Ok(SchemaVersion::V2_0_3),
            "2.2" => Ok(SchemaVersion::V2_2),
            other => Err(DocumentError::UnsupportedSchemaVersion(other.to_string())),
        }
    }
}

crate::simple_display! {
    SchemaVersion {
        V1_0 => "1.0",
        V1_2 => "1.2",
        V2_0 => "2.0",
        V2_0_1 => "2.0.1",
        V2_0_2 => "2.0.2",
        V2_0_3 => "2.0.3",
        V2_2 => "2.2",
    }
}

/// Identity and lifecycle attributes of one document run (invariant 1, 4, 5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentInformation {
    pub document_id: DocumentId,
    pub command_id: CommandId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub association_id: Option<AssociationId>,
    pub instance_id: InstanceId,
    pub message_id: MessageId,
    pub run_id: RunId,
    pub created_date: u64,
    pub document_name: String,
    pub document_version: String,
    pub document_status: Status,
    pub run_count: u32,
    #[serde(default)]
    pub proc_info: ProcInfo,
}

/// Target of a cancel document: which prior message/command it cancels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelInformation {
    pub cancel_message_id: MessageId,
    pub cancel_command_id: CommandId,
    #[serde(default)]
    pub payload: String,
    #[serde(default)]
    pub debug_info: String,
}

/// Where this document's output artifacts live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IoConfig {
    pub orchestration_directory: String,
    #[serde(default)]
    pub output_s3_bucket_name: String,
    #[serde(default)]
    pub output_s3_key_prefix: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_watch_log_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_watch_stream_prefix: Option<String>,
}

/// The persistent unit of work: identity, schema, ordered plugin list, and
/// (for cancel documents) the cancel target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentState {
    pub information: DocumentInformation,
    pub document_type: DocumentType,
    pub schema_version: SchemaVersion,
    pub plugins: Vec<PluginState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_information: Option<CancelInformation>,
    pub io_config: IoConfig,
}

impl DocumentState {
    /// Look up a plugin's state by id, preserving document order.
    pub fn plugin(&self, id: &PluginId) -> Option<&PluginState> {
        self.plugins.iter().find(|p| p.plugin_id() == id)
    }

    pub fn plugin_mut(&mut self, id: &PluginId) -> Option<&mut PluginState> {
        self.plugins.iter_mut().find(|p| p.plugin_id() == id)
    }

    /// Record a plugin result by id, enforcing the write-once invariant.
    /// Returns `UnknownPlugin` if no step in this document carries that id.
    pub fn record_result(
        &mut self,
        id: &PluginId,
        result: crate::plugin::PluginResult,
    ) -> Result<(), DocumentError> {
        match self.plugin_mut(id) {
            Some(state) => state.set_result(result),
            None => Err(DocumentError::UnknownPlugin(id.to_string())),
        }
    }

    /// An ordered, name-keyed view of every sealed plugin result, as the
    /// Result Aggregator consumes it.
    pub fn results_by_plugin(&self) -> IndexMap<PluginId, crate::plugin::PluginResult> {
        self.plugins
            .iter()
            .filter_map(|p| p.result.clone().map(|r| (p.plugin_id().clone(), r)))
            .collect()
    }

    /// Whether any plugin in this document demanded a reboot on success.
    pub fn is_reboot_required(&self) -> bool {
        self.information.document_status == Status::SuccessAndReboot
    }

    /// Validates that a cancel-typed document actually carries cancel
    /// information, per invariant checked before dispatch.
    pub fn validate_cancel_information(&self) -> Result<(), DocumentError> {
        if self.document_type.is_cancel() && self.cancel_information.is_none() {
            return Err(DocumentError::MissingCancelInformation);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "document_tests.rs"]
mod tests;
