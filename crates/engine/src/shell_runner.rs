// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A genuine, runnable [`PluginRunner`] (§6): executes each step's
//! `command` (read from `properties`, falling back to `settings`) as a
//! shell command, sequentially and in document order, capturing output
//! through [`IoHandler`]. Individual plugin implementations (shell
//! runner, file download, inventory collector) are named in §1 as out
//! of scope for this core; this one exists so `docd` and `doc-worker`
//! have something real to run end to end, the same way
//! [`doc_adapters::FileSystemPoller`]/`FileSystemUploader` stand in for
//! the cloud poller/uploader.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use doc_adapters::{AdapterError, PluginRunner};
use doc_core::{CancelObserver, CancelState, Clock, DocumentState, PluginResult, Status, SystemClock};
use tokio::process::Command;
use tokio::sync::mpsc;

use crate::io::IoHandler;

/// Runs `command` (a string found in `properties`, or `settings` as a
/// fallback) through `sh -c`. A step with no `command` field, or one
/// whose command fails to spawn, is reported `Failed` rather than
/// aborting the rest of the document.
pub struct ShellPluginRunner {
    clock: SystemClock,
}

impl ShellPluginRunner {
    pub fn new() -> Self {
        Self { clock: SystemClock }
    }
}

impl Default for ShellPluginRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginRunner for ShellPluginRunner {
    async fn run(
        &self,
        document: &DocumentState,
        results: mpsc::Sender<PluginResult>,
        cancel: CancelObserver,
    ) -> Result<(), AdapterError> {
        for plugin in &document.plugins {
            let plugin_id = plugin.plugin_id().clone();
            let plugin_name = plugin.configuration.plugin_name.clone();
            let start = self.clock.epoch_ms();

            if cancel.current() == CancelState::Canceled {
                let mut result = PluginResult::running(plugin_id, plugin_name, start);
                result.status = Status::Cancelled;
                result.end_date_time = Some(self.clock.epoch_ms());
                if results.send(result).await.is_err() {
                    return Ok(());
                }
                continue;
            }

            let result = self.run_one(plugin, start).await;
            if results.send(result).await.is_err() {
                return Ok(());
            }
        }
        Ok(())
    }
}

impl ShellPluginRunner {
    async fn run_one(&self, plugin: &doc_core::PluginState, start: u64) -> PluginResult {
        let plugin_id = plugin.plugin_id().clone();
        let plugin_name = plugin.configuration.plugin_name.clone();
        let mut result = PluginResult::running(plugin_id, plugin_name, start);

        // The document parser maps a `mainSteps` entry's `inputs` block to
        // `properties` and its (rarely used) `settings` block straight
        // across; either may carry the command this runner executes.
        let command = plugin
            .configuration
            .properties
            .get("command")
            .or_else(|| plugin.configuration.settings.get("command"))
            .and_then(|v| v.as_str());
        let Some(command) = command else {
            result.status = Status::Failed;
            result.error = Some("plugin configuration has no properties.command or settings.command".to_string());
            result.end_date_time = Some(self.clock.epoch_ms());
            return result;
        };

        let io = match IoHandler::init(Path::new(&plugin.configuration.orchestration_directory)).await {
            Ok(io) => io,
            Err(e) => {
                result.status = Status::Failed;
                result.error = Some(format!("failed to initialize plugin output capture: {e}"));
                result.end_date_time = Some(self.clock.epoch_ms());
                return result;
            }
        };

        let output = Command::new("sh").arg("-c").arg(command).stdin(Stdio::null()).output().await;

        match output {
            Ok(output) => {
                io.append_info(&output.stdout).await;
                io.append_error(&output.stderr).await;
                result.standard_output = String::from_utf8_lossy(&output.stdout).into_owned();
                result.standard_error = String::from_utf8_lossy(&output.stderr).into_owned();
                result.output = io.close().await;
                result.code = output.status.code().unwrap_or(-1);
                result.status = if output.status.success() { Status::Success } else { Status::Failed };
                if !output.status.success() {
                    result.error = Some(format!("command exited with status {}", result.code));
                }
            }
            Err(e) => {
                result.output = io.close().await;
                result.status = Status::Failed;
                result.error = Some(format!("failed to spawn command: {e}"));
            }
        }

        result.end_date_time = Some(self.clock.epoch_ms());
        result
    }
}

#[cfg(test)]
#[path = "shell_runner_tests.rs"]
mod tests;
