// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Out-of-Proc Executer (§4.6): launches or reattaches to a worker
//! subprocess keyed by `DocumentID`, runs the Messaging Loop against an
//! [`ExecuterBackend`], and persists state on exit.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use doc_adapters::ProcessAdapter;
use doc_core::{CancelObserver, DocumentId, DocumentResult, DocumentState, DocumentType, InstanceId};
use doc_storage::DocumentStore;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::backend_executer::{spawn_supervisor, ExecuterBackend};
use crate::channel::Channel;
use crate::error::ExecuteError;
use crate::messaging::{run_messaging_loop, StopSignal};
use crate::sequence::Role;
use crate::Executer;

/// Which worker binary mode a `DocumentType` spawns, per §4.6's worker
/// binary selection table. A new `DocumentType` variant forces a decision
/// here rather than falling through a stringly-typed dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerKind {
    Document,
    Session,
}

impl WorkerKind {
    pub fn for_document_type(document_type: DocumentType) -> Self {
        match document_type {
            DocumentType::StartSession => WorkerKind::Session,
            DocumentType::SendCommand
            | DocumentType::CancelCommand
            | DocumentType::Association
            | DocumentType::SendCommandOffline
            | DocumentType::CancelCommandOffline => WorkerKind::Document,
        }
    }

    pub fn mode_flag(&self) -> &'static str {
        match self {
            WorkerKind::Document => "document",
            WorkerKind::Session => "session",
        }
    }
}

/// Tuning for [`OutOfProcExecuter`]: where the IPC channels live, the
/// worker binary to spawn, and how long the Messaging Loop tolerates
/// silence before giving up.
#[derive(Debug, Clone)]
pub struct OutOfProcConfig {
    pub ipc_root: PathBuf,
    pub worker_binary: PathBuf,
    pub stop_timer: Duration,
}

pub struct OutOfProcExecuter<S: DocumentStore, P: ProcessAdapter> {
    store: Arc<S>,
    process: Arc<P>,
    config: OutOfProcConfig,
}

impl<S: DocumentStore, P: ProcessAdapter> OutOfProcExecuter<S, P> {
    pub fn new(store: Arc<S>, process: Arc<P>, config: OutOfProcConfig) -> Self {
        Self { store, process, config }
    }

    fn worker_argv(document: &DocumentState, instance_id: &InstanceId) -> Vec<String> {
        let kind = WorkerKind::for_document_type(document.document_type);
        vec![
            "--mode".to_string(),
            kind.mode_flag().to_string(),
            document.information.document_id.to_string(),
            instance_id.to_string(),
        ]
    }

    /// Emits a single terminal `DocumentResult` then closes the channel, per
    /// the propagation rule for fatal spawn/reattach errors.
    async fn fail_fast(document: &DocumentState, result_tx: mpsc::Sender<DocumentResult>, status: doc_core::Status) {
        let result = DocumentResult {
            status,
            plugin_results: Default::default(),
            last_plugin: None,
            message_id: document.information.message_id,
            association_id: document.information.association_id,
            document_name: document.information.document_name.clone(),
            document_version: document.information.document_version.clone(),
            n_plugins: document.plugins.len(),
        };
        let _ = result_tx.send(result).await;
    }
}

#[async_trait]
impl<S, P> Executer for OutOfProcExecuter<S, P>
where
    S: DocumentStore + 'static,
    P: ProcessAdapter + 'static,
{
    async fn run(&self, instance_id: InstanceId, document_id: DocumentId, cancel: CancelObserver) -> Result<mpsc::Receiver<DocumentResult>, ExecuteError> {
        let mut document = self.store.load(&instance_id, &document_id).await?;
        document.information.run_count += 1;
        self.store.save(&instance_id, &document).await?;

        let (result_tx, result_rx) = mpsc::channel(document.plugins.len().max(1) + 1);

        let channel = Channel::open(&self.config.ipc_root, document_id.as_str(), Role::Master).await?;

        if !channel.found() {
            let argv = Self::worker_argv(&document, &instance_id);
            let handle = match self.process.spawn(&self.config.worker_binary.to_string_lossy(), &argv).await {
                Ok(handle) => handle,
                Err(e) => {
                    tracing::error!(error = %e, document_id = %document_id, "out-of-proc executer: failed to spawn worker");
                    channel.destroy().await?;
                    return Err(ExecuteError::Adapter(e));
                }
            };
            document.information.proc_info = handle.proc_info();
            self.store.save(&instance_id, &document).await?;
            self.spawn_and_run(document, channel, result_tx.clone(), cancel, Some(handle)).await?;
        } else {
            let proc_info = document.information.proc_info;
            if !self.process.find_by_pid_and_start_time(proc_info.pid, proc_info.start_time) {
                tracing::warn!(document_id = %document_id, pid = proc_info.pid, "out-of-proc executer: orphan worker is dead, failing the run");
                channel.destroy().await?;
                Self::fail_fast(&document, result_tx, doc_core::Status::Failed).await;
                return Ok(result_rx);
            }
            self.spawn_and_run(document, channel, result_tx.clone(), cancel, None).await?;
        }

        Ok(result_rx)
    }
}

impl<S, P> OutOfProcExecuter<S, P>
where
    S: DocumentStore + 'static,
    P: ProcessAdapter + 'static,
{
    /// Runs the Messaging Loop against a freshly opened or reattached
    /// channel. `handle`, if this call just spawned the worker, is reaped in
    /// a background task whose exit wakes the loop via `Terminate`.
    async fn spawn_and_run(
        &self,
        document: DocumentState,
        channel: Channel,
        result_tx: mpsc::Sender<DocumentResult>,
        cancel: CancelObserver,
        handle: Option<doc_adapters::ProcessHandle>,
    ) -> Result<(), ExecuteError> {
        let state = Arc::new(Mutex::new(document));
        let (accept_tx, accept_rx) = mpsc::channel(32);
        let (stop_tx, stop_rx) = mpsc::channel(8);

        let _supervisor = spawn_supervisor(Arc::clone(&state), cancel, accept_tx, stop_tx.clone());
        let backend = ExecuterBackend::new(Arc::clone(&state), result_tx, stop_tx.clone());

        if let Some(mut handle) = handle {
            let process = Arc::clone(&self.process);
            let stop_tx = stop_tx.clone();
            tokio::spawn(async move {
                if let Err(e) = process.wait(&mut handle).await {
                    tracing::warn!(error = %e, "out-of-proc executer: worker wait failed");
                }
                let _ = stop_tx.send(StopSignal::Terminate).await;
            });
        }

        let store = Arc::clone(&self.store);
        let instance_id = state.lock().information.instance_id;
        let stop_timer = self.config.stop_timer;

        tokio::spawn(async move {
            if let Err(e) = run_messaging_loop(channel, backend, stop_rx, accept_rx, stop_timer).await {
                tracing::warn!(error = %e, "out-of-proc executer: messaging loop ended with an error");
            }
            let final_state = state.lock().clone();
            if let Err(e) = store.save(&instance_id, &final_state).await {
                tracing::error!(error = %e, "out-of-proc executer: failed to persist final document state");
            }
        });

        Ok(())
    }
}

#[cfg(test)]
#[path = "out_of_proc_tests.rs"]
mod tests;
