// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-step plugin configuration, state, and result.

use serde::{Deserialize, Serialize};

use crate::ids::PluginId;
use crate::status::Status;

/// Precondition expressions attached to a step (schema 2.2+).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preconditions {
    #[serde(default)]
    pub expressions: Vec<String>,
}

/// Fully realized per-step configuration produced by the document parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub plugin_name: String,
    pub plugin_id: PluginId,
    /// Settings block, substituted and resolved.
    #[serde(default)]
    pub settings: serde_json::Value,
    /// Properties block, substituted and resolved.
    #[serde(default)]
    pub properties: serde_json::Value,
    pub orchestration_directory: String,
    pub output_s3_key_prefix: String,
    #[serde(default)]
    pub preconditions: Preconditions,
    /// `schemaVersion >= "2.2"`.
    pub is_precondition_enabled: bool,
}

/// Per-plugin terminal output, embedded into the surrounding document on
/// persist. Created when the plugin starts; sealed (write-once) when the
/// plugin reports a terminal status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginResult {
    pub plugin_id: PluginId,
    pub plugin_name: String,
    pub status: Status,
    pub code: i32,
    #[serde(default)]
    pub output: String,
    pub start_date_time: u64,
    pub end_date_time: Option<u64>,
    #[serde(default)]
    pub standard_output: String,
    #[serde(default)]
    pub standard_error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub output_s3_key_prefix: String,
    #[serde(default)]
    pub output_s3_bucket_name: String,
}

impl PluginResult {
    pub fn running(plugin_id: PluginId, plugin_name: impl Into<String>, start_date_time: u64) -> Self {
        Self {
            plugin_id,
            plugin_name: plugin_name.into(),
            status: Status::InProgress,
            code: 0,
            output: String::new(),
            start_date_time,
            end_date_time: None,
            standard_output: String::new(),
            standard_error: String::new(),
            error: None,
            output_s3_key_prefix: String::new(),
            output_s3_bucket_name: String::new(),
        }
    }

    pub fn is_sealed(&self) -> bool {
        self.status.is_terminal()
    }
}

/// One step in a document's plugin list: its realized configuration plus
/// the in-place result slot, updated as the plugin runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginState {
    pub configuration: Configuration,
    #[serde(default)]
    pub result: Option<PluginResult>,
}

impl PluginState {
    pub fn new(configuration: Configuration) -> Self {
        Self { configuration, result: None }
    }

    pub fn plugin_id(&self) -> &PluginId {
        &self.configuration.plugin_id
    }

    /// Record a plugin result, enforcing write-once-per-run on terminal
    /// statuses (invariant 2 of the document model).
    pub fn set_result(&mut self, result: PluginResult) -> Result<(), crate::error::DocumentError> {
        if let Some(existing) = &self.result {
            if existing.is_sealed() {
                return Err(crate::error::DocumentError::ResultAlreadySealed(
                    self.configuration.plugin_id.to_string(),
                ));
            }
        }
        self.result = Some(result);
        Ok(())
    }

    pub fn status(&self) -> Status {
        self.result.as_ref().map(|r| r.status).unwrap_or(Status::Pending)
    }
}

#[cfg(test)]
#[path = "plugin_tests.rs"]
mod tests;
