// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory fakes for the pluggable interfaces, for use by this crate's
//! and its dependents' tests. Gated behind `#[cfg(any(test, feature =
//! "test-support"))]`, matching the `doc-core` test-support convention.

use std::collections::HashMap;

use async_trait::async_trait;
use doc_core::{CancelObserver, CancelState, DocumentState, PluginResult, Status};
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::error::AdapterError;
use crate::parameter_store::ParameterStore;
use crate::plugin_runner::PluginRunner;
use crate::poller::Poller;
use crate::uploader::Uploader;

/// A [`PluginRunner`] that reports a fixed status for every plugin in
/// document order, observing cancellation between steps.
pub struct FakePluginRunner {
    pub status_for: HashMap<String, Status>,
    pub default_status: Status,
}

impl FakePluginRunner {
    pub fn new(default_status: Status) -> Self {
        Self { status_for: HashMap::new(), default_status }
    }

    pub fn with_status(mut self, plugin_id: impl Into<String>, status: Status) -> Self {
        self.status_for.insert(plugin_id.into(), status);
        self
    }
}

#[async_trait]
impl PluginRunner for FakePluginRunner {
    async fn run(
        &self,
        document: &DocumentState,
        results: mpsc::Sender<PluginResult>,
        mut cancel: CancelObserver,
    ) -> Result<(), AdapterError> {
        for plugin in &document.plugins {
            if cancel.current() == CancelState::Canceled {
                let mut result =
                    PluginResult::running(plugin.plugin_id().clone(), plugin.configuration.plugin_name.clone(), 0);
                result.status = Status::Cancelled;
                result.end_date_time = Some(0);
                let _ = results.send(result).await;
                continue;
            }

            let status =
                self.status_for.get(plugin.plugin_id().as_str()).copied().unwrap_or(self.default_status);
            let mut result =
                PluginResult::running(plugin.plugin_id().clone(), plugin.configuration.plugin_name.clone(), 0);
            result.status = status;
            result.end_date_time = Some(0);
            if results.send(result).await.is_err() {
                break;
            }
        }
        Ok(())
    }
}

/// A [`ParameterStore`] backed by an in-memory map.
pub struct FakeParameterStore {
    values: HashMap<String, String>,
}

impl FakeParameterStore {
    pub fn new(values: HashMap<String, String>) -> Self {
        Self { values }
    }
}

#[async_trait]
impl ParameterStore for FakeParameterStore {
    async fn get(&self, name: &str) -> Result<String, AdapterError> {
        self.values.get(name).cloned().ok_or_else(|| AdapterError::ParameterNotFound(name.to_string()))
    }
}

/// A [`Poller`] that replays a fixed queue of documents, then blocks
/// forever (matching a real poller's "no more work yet" behavior).
pub struct FakePoller {
    queue: Mutex<Vec<DocumentState>>,
}

impl FakePoller {
    pub fn new(documents: Vec<DocumentState>) -> Self {
        Self { queue: Mutex::new(documents) }
    }
}

#[async_trait]
impl Poller for FakePoller {
    async fn next_document(&self) -> Result<DocumentState, AdapterError> {
        match self.queue.lock().pop() {
            Some(doc) => Ok(doc),
            None => std::future::pending().await,
        }
    }
}

/// An [`Uploader`] that records every result it is given, for assertions.
#[derive(Default)]
pub struct FakeUploader {
    pub uploaded: Mutex<Vec<doc_core::DocumentResult>>,
}

#[async_trait]
impl Uploader for FakeUploader {
    async fn upload(&self, result: &doc_core::DocumentResult) -> Result<(), AdapterError> {
        self.uploaded.lock().push(result.clone());
        Ok(())
    }
}

#[cfg(test)]
#[path = "fakes_tests.rs"]
mod tests;
