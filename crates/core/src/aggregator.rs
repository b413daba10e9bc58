// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The pure function that folds per-plugin statuses into a document status.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::ids::PluginId;
use crate::plugin::PluginResult;
use crate::status::Status;

/// Outcome of one aggregation pass: the folded document status plus a
/// status-name histogram used for telemetry.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub status: Status,
    pub status_count: HashMap<Status, usize>,
}

fn status_count(results: &IndexMap<PluginId, PluginResult>) -> HashMap<Status, usize> {
    let mut counts = HashMap::new();
    for result in results.values() {
        *counts.entry(result.status).or_insert(0) += 1;
    }
    counts
}

/// Folds `results` into a document-level [`Aggregate`].
///
/// `last_plugin` names the plugin that just finished, for an intermediate
/// `reply` update; intermediate updates always fold to `InProgress` so they
/// never claim a terminal document status ahead of the run actually
/// finishing. Pass `None` exactly once, for the final `complete` update,
/// to run the full precedence fold over `results` against `total_plugins`.
pub fn aggregate(
    last_plugin: Option<&PluginId>,
    results: &IndexMap<PluginId, PluginResult>,
    total_plugins: usize,
) -> Aggregate {
    let status_count = status_count(results);

    if last_plugin.is_some() {
        return Aggregate { status: Status::InProgress, status_count };
    }

    let statuses: Vec<Status> = results.values().map(|r| r.status).collect();

    let status = if statuses.iter().any(|s| *s == Status::Failed) {
        Status::Failed
    } else if statuses.iter().any(|s| *s == Status::Cancelled) {
        Status::Cancelled
    } else if statuses.iter().any(|s| *s == Status::TimedOut) {
        Status::TimedOut
    } else if statuses.iter().any(|s| *s == Status::SuccessAndReboot) {
        Status::SuccessAndReboot
    } else if results.len() == total_plugins && statuses.iter().all(|s| s.counts_as_success()) {
        Status::Success
    } else {
        Status::InProgress
    };

    Aggregate { status, status_count }
}

#[cfg(test)]
#[path = "aggregator_tests.rs"]
mod tests;
