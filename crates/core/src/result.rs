// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-update message published on an Executer's result channel.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::ids::{AssociationId, MessageId, PluginId};
use crate::plugin::PluginResult;
use crate::status::Status;

/// One update on an Executer's result channel. `last_plugin.is_none()` marks
/// the final, document-level update; otherwise it names the plugin that
/// just transitioned (invariant: exactly one final update, last on the
/// channel before close).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentResult {
    pub status: Status,
    pub plugin_results: IndexMap<PluginId, PluginResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_plugin: Option<PluginId>,
    pub message_id: MessageId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub association_id: Option<AssociationId>,
    pub document_name: String,
    pub document_version: String,
    pub n_plugins: usize,
}

impl DocumentResult {
    /// Whether this update is the final, document-level result.
    pub fn is_final(&self) -> bool {
        self.last_plugin.is_none()
    }
}

#[cfg(test)]
#[path = "result_tests.rs"]
mod tests;
