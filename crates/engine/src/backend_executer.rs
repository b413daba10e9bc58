// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Executer Backend (§4.4): the master-side [`crate::messaging::Backend`].
//! Owns the run's `DocumentState`, folds worker replies into it, and
//! republishes each update on the result channel the caller of
//! [`crate::Executer::run`] is reading from.

use std::sync::Arc;

use async_trait::async_trait;
use doc_core::{CancelObserver, CancelState, DocumentResult, DocumentState};
use doc_wire::{Datagram, MessageKind, ProtocolError};
use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::ExecuteError;
use crate::messaging::{Backend, StopSignal};

/// Wire payload for `reply`/`complete` datagrams sent worker → master: the
/// worker's accumulated view of plugin results, plus the plugin that just
/// finished (`None` on `complete`, per the final document-level fold).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyContent {
    pub status: doc_core::Status,
    pub plugin_results: IndexMap<doc_core::PluginId, doc_core::PluginResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_plugin: Option<doc_core::PluginId>,
}

/// Empty payload carried by the `cancel` datagram; cancellation is
/// conveyed entirely by the datagram's `type`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CancelContent {}

/// Spawns the Executer Backend's supervisory task (§4.4's "On creation").
///
/// Emits the initial `pluginconfig` datagram carrying the full
/// `DocumentState`, then waits on `cancel` for a terminal transition:
/// `Canceled` emits a `cancel` datagram, `ShutDown` publishes a graceful
/// stop. Either way (and on `Completed`), the task returns and drops
/// `accept_tx`, closing the messaging loop's outbound side.
pub fn spawn_supervisor(
    state: Arc<Mutex<DocumentState>>,
    mut cancel: CancelObserver,
    accept_tx: mpsc::Sender<Datagram>,
    stop_tx: mpsc::Sender<StopSignal>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let snapshot = state.lock().clone();
        match Datagram::create(MessageKind::Pluginconfig, &snapshot) {
            Ok(datagram) => {
                if accept_tx.send(datagram).await.is_err() {
                    return;
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "executer backend: failed to marshal pluginconfig");
                return;
            }
        }

        loop {
            match cancel.changed().await {
                CancelState::Canceled => {
                    match Datagram::create(MessageKind::Cancel, &CancelContent::default()) {
                        Ok(datagram) => {
                            let _ = accept_tx.send(datagram).await;
                        }
                        Err(e) => tracing::error!(error = %e, "executer backend: failed to marshal cancel"),
                    }
                    return;
                }
                CancelState::ShutDown => {
                    let _ = stop_tx.send(StopSignal::Shutdown).await;
                    return;
                }
                CancelState::Completed => return,
                CancelState::Pending => continue,
            }
        }
    })
}

/// The master-side backend driven by the messaging loop.
pub struct ExecuterBackend {
    state: Arc<Mutex<DocumentState>>,
    result_tx: mpsc::Sender<DocumentResult>,
    stop_tx: mpsc::Sender<StopSignal>,
}

impl ExecuterBackend {
    pub fn new(state: Arc<Mutex<DocumentState>>, result_tx: mpsc::Sender<DocumentResult>, stop_tx: mpsc::Sender<StopSignal>) -> Self {
        Self { state, result_tx, stop_tx }
    }

    /// Folds one `reply`/`complete` payload into the owned `DocumentState`
    /// and republishes it as a `DocumentResult`. Duplicate plugin ids (the
    /// reattach/zombie-worker case of §4.6) are treated as overwrites, not
    /// write-once violations — this path bypasses `PluginState::set_result`
    /// deliberately.
    async fn handle_update(&mut self, content: ReplyContent) -> Result<(), ExecuteError> {
        let document_result = {
            let mut state = self.state.lock();
            for (id, result) in &content.plugin_results {
                if let Some(plugin) = state.plugin_mut(id) {
                    plugin.result = Some(result.clone());
                }
            }
            state.information.document_status = content.status;

            DocumentResult {
                status: content.status,
                plugin_results: content.plugin_results.clone(),
                last_plugin: content.last_plugin,
                message_id: state.information.message_id,
                association_id: state.information.association_id,
                document_name: state.information.document_name.clone(),
                document_version: state.information.document_version.clone(),
                n_plugins: state.plugins.len(),
            }
        };

        if self.result_tx.send(document_result).await.is_err() {
            tracing::warn!("executer backend: result channel closed, dropping update");
        }
        Ok(())
    }
}

#[async_trait]
impl Backend for ExecuterBackend {
    async fn process(&mut self, datagram: Datagram) -> Result<(), ExecuteError> {
        match datagram.kind()? {
            MessageKind::Reply => {
                let content: ReplyContent = datagram.content_as()?;
                self.handle_update(content).await
            }
            MessageKind::Complete => {
                let content: ReplyContent = datagram.content_as()?;
                self.handle_update(content).await?;
                let _ = self.stop_tx.send(StopSignal::Terminate).await;
                Ok(())
            }
            other => Err(ExecuteError::Protocol(ProtocolError::UnsupportedType(format!("{other:?}")))),
        }
    }
}

#[cfg(test)]
#[path = "backend_executer_tests.rs"]
mod tests;
