// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Worker Backend (§4.5): the worker-side [`crate::messaging::Backend`]
//! that hosts the plugin runner and streams its results back to the
//! master as `reply`/`complete` datagrams.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use doc_adapters::PluginRunner;
use doc_core::{aggregate, CancelFlag, DocumentState, PluginId, PluginResult, Status};
use doc_wire::{Datagram, MessageKind, ProtocolError};
use futures_util::FutureExt;
use indexmap::IndexMap;
use std::panic::AssertUnwindSafe;
use tokio::sync::mpsc;

use crate::backend_executer::ReplyContent;
use crate::error::ExecuteError;
use crate::messaging::{Backend, StopSignal};

/// Hosts a [`PluginRunner`] on the worker side of the channel. `pluginconfig`
/// starts the runner (once, guarded by `started`); `cancel` propagates to
/// the runner's cancel-flag.
pub struct WorkerBackend<R: PluginRunner + 'static> {
    runner: Arc<R>,
    cancel: CancelFlag,
    started: AtomicBool,
    accept_tx: Option<mpsc::Sender<Datagram>>,
    stop_tx: mpsc::Sender<StopSignal>,
}

impl<R: PluginRunner + 'static> WorkerBackend<R> {
    pub fn new(runner: Arc<R>, accept_tx: mpsc::Sender<Datagram>, stop_tx: mpsc::Sender<StopSignal>) -> Self {
        Self { runner, cancel: CancelFlag::new(), started: AtomicBool::new(false), accept_tx: Some(accept_tx), stop_tx }
    }

    /// Starts the plugin runner and its listener exactly once. `accept_tx`
    /// is moved into the listener task; when the task ends (after emitting
    /// `complete`), its drop closes the messaging loop's outbound side —
    /// the "close the input channel" step of §4.5.
    fn start(&mut self, document: DocumentState) {
        let Some(accept_tx) = self.accept_tx.take() else { return };
        let runner = Arc::clone(&self.runner);
        let cancel_observer = self.cancel.observer();
        let stop_tx = self.stop_tx.clone();

        tokio::spawn(async move {
            let total_plugins = document.plugins.len();
            let (result_tx, result_rx) = mpsc::channel::<PluginResult>(total_plugins.max(1));

            let listener = tokio::spawn(run_listener(result_rx, total_plugins, accept_tx, stop_tx));

            if let Err(e) = runner.run(&document, result_tx, cancel_observer).await {
                tracing::warn!(error = %e, "worker backend: plugin runner returned an error");
            }

            let _ = listener.await;
        });
    }
}

/// Collects plugin results as they arrive, keyed by `PluginID`, emitting a
/// `reply` after each and a final `complete` once the channel closes.
/// Panic-safe: a panic anywhere in this loop is caught and reported as a
/// final `Failed` status (§4.5).
async fn run_listener(
    mut result_rx: mpsc::Receiver<PluginResult>,
    total_plugins: usize,
    accept_tx: mpsc::Sender<Datagram>,
    stop_tx: mpsc::Sender<StopSignal>,
) {
    let outcome = AssertUnwindSafe(collect_and_reply(&mut result_rx, total_plugins, &accept_tx)).catch_unwind().await;

    match outcome {
        Ok(Ok(results)) => {
            let fold = aggregate(None, &results, total_plugins);
            emit_complete(&accept_tx, fold.status, results).await;
        }
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "worker backend: failed to marshal a reply");
            emit_complete(&accept_tx, Status::Failed, IndexMap::new()).await;
        }
        Err(_) => {
            tracing::error!("worker backend: plugin listener panicked, reporting document failed");
            emit_complete(&accept_tx, Status::Failed, IndexMap::new()).await;
        }
    }

    let _ = stop_tx.send(StopSignal::Shutdown).await;
    // accept_tx and stop_tx both drop here, closing this task's handles.
}

async fn collect_and_reply(
    result_rx: &mut mpsc::Receiver<PluginResult>,
    total_plugins: usize,
    accept_tx: &mpsc::Sender<Datagram>,
) -> Result<IndexMap<PluginId, PluginResult>, ProtocolError> {
    let mut results = IndexMap::new();

    while let Some(result) = result_rx.recv().await {
        let plugin_id = result.plugin_id.clone();
        results.insert(plugin_id.clone(), result);

        let fold = aggregate(Some(&plugin_id), &results, total_plugins);
        let content = ReplyContent { status: fold.status, plugin_results: results.clone(), last_plugin: Some(plugin_id) };
        let datagram = Datagram::create(MessageKind::Reply, &content)?;
        if accept_tx.send(datagram).await.is_err() {
            break;
        }
    }

    Ok(results)
}

async fn emit_complete(accept_tx: &mpsc::Sender<Datagram>, status: Status, results: IndexMap<PluginId, PluginResult>) {
    let content = ReplyContent { status, plugin_results: results, last_plugin: None };
    match Datagram::create(MessageKind::Complete, &content) {
        Ok(datagram) => {
            let _ = accept_tx.send(datagram).await;
        }
        Err(e) => tracing::error!(error = %e, "worker backend: failed to marshal complete"),
    }
}

#[async_trait]
impl<R: PluginRunner + 'static> Backend for WorkerBackend<R> {
    async fn process(&mut self, datagram: Datagram) -> Result<(), ExecuteError> {
        match datagram.kind()? {
            MessageKind::Pluginconfig => {
                let document: DocumentState = datagram.content_as()?;
                if !self.started.swap(true, Ordering::SeqCst) {
                    self.start(document);
                }
                Ok(())
            }
            MessageKind::Cancel => {
                self.cancel.cancel();
                Ok(())
            }
            other => Err(ExecuteError::Protocol(ProtocolError::UnsupportedType(format!("{other:?}")))),
        }
    }
}

#[cfg(test)]
#[path = "backend_worker_tests.rs"]
mod tests;
