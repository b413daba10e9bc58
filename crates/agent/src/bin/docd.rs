// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The master daemon: polls the inbox for documents, dispatches each to
//! the Out-of-Proc Executer, and uploads every `DocumentResult` as it
//! streams in. Cancel documents are not executed themselves — they flip
//! the `CancelFlag` of the run they target.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use doc_adapters::{FileSystemPoller, FileSystemUploader, Poller, ProcessAdapterConfig, StdProcessAdapter, Uploader};
use doc_core::{CancelFlag, CommandId, DocumentResult, DocumentState, Status};
use doc_engine::{Executer, OutOfProcConfig, OutOfProcExecuter};
use doc_storage::{DocumentStore, FileDocumentStore};
use parking_lot::Mutex;

/// Active runs keyed by `CommandId`, so a `CancelCommand` document can
/// find and flip the `CancelFlag` of the run it targets.
type CancelRegistry = Arc<Mutex<HashMap<CommandId, Arc<CancelFlag>>>>;

#[tokio::main]
async fn main() {
    let config_path = std::env::args().nth(1).map(PathBuf::from).unwrap_or_else(|| PathBuf::from("docd.toml"));
    let config = match doc_agent::AgentConfig::load(&config_path) {
        Ok(c) => c,
        Err(_) => doc_agent::AgentConfig::default(),
    };

    let _guard = doc_agent::init_tracing(&config.orchestration_root.join("logs"), "docd");
    tracing::info!(role = "master", ?config_path, "docd starting");

    let store = Arc::new(FileDocumentStore::new(config.orchestration_root.clone()));
    let process = Arc::new(StdProcessAdapter::new(ProcessAdapterConfig {
        start_time_tolerance_secs: config.process_start_time_tolerance.as_secs(),
    }));
    let poller = FileSystemPoller::new(config.inbox_root.clone(), config.poll_interval);
    let uploader = Arc::new(FileSystemUploader::new(config.outbox_root.clone()));
    let executer = Arc::new(OutOfProcExecuter::new(
        Arc::clone(&store),
        Arc::clone(&process),
        OutOfProcConfig {
            ipc_root: config.ipc_root.clone(),
            worker_binary: config.worker_binary.clone(),
            stop_timer: config.stop_timer,
        },
    ));

    let registry: CancelRegistry = Arc::new(Mutex::new(HashMap::new()));

    loop {
        let document = match poller.next_document().await {
            Ok(document) => document,
            Err(e) => {
                tracing::error!(error = %e, "docd: poller failed");
                continue;
            }
        };

        if document.document_type.is_cancel() {
            handle_cancel(document, &registry, Arc::clone(&uploader)).await;
            continue;
        }

        if let Err(e) = store.save(&document.information.instance_id, &document).await {
            tracing::error!(error = %e, document_id = %document.information.document_id, "docd: failed to persist incoming document");
            continue;
        }

        let cancel = Arc::new(CancelFlag::new());
        registry.lock().insert(document.information.command_id, Arc::clone(&cancel));

        let executer = Arc::clone(&executer);
        let uploader = Arc::clone(&uploader);
        let registry = Arc::clone(&registry);
        let instance_id = document.information.instance_id;
        let document_id = document.information.document_id;
        let command_id = document.information.command_id;

        tokio::spawn(async move {
            let span = tracing::info_span!("run", role = "master", document_id = %document_id);
            let _enter = span.enter();

            match executer.run(instance_id, document_id, cancel.observer()).await {
                Ok(mut result_rx) => {
                    while let Some(result) = result_rx.recv().await {
                        let is_final = result.is_final();
                        if let Err(e) = uploader.upload(&result).await {
                            tracing::error!(error = %e, "docd: failed to upload document result");
                        }
                        if is_final {
                            break;
                        }
                    }
                }
                Err(e) => tracing::error!(error = %e, "docd: executer failed to start"),
            }

            registry.lock().remove(&command_id);
        });
    }
}

async fn handle_cancel(document: DocumentState, registry: &CancelRegistry, uploader: Arc<FileSystemUploader>) {
    let document_id = document.information.document_id;
    let Some(ci) = document.cancel_information.as_ref() else {
        tracing::warn!(document_id = %document_id, "docd: cancel document missing cancel information");
        return;
    };
    let target = ci.cancel_command_id;

    let found = registry.lock().get(&target).cloned();
    let status = match found {
        Some(cancel) => {
            cancel.cancel();
            tracing::info!(document_id = %document_id, target = %target, "docd: cancel delivered to running document");
            Status::Success
        }
        None => {
            tracing::warn!(document_id = %document_id, target = %target, "docd: cancel target is not an active run");
            Status::Failed
        }
    };

    let result = DocumentResult {
        status,
        plugin_results: Default::default(),
        last_plugin: None,
        message_id: document.information.message_id,
        association_id: document.information.association_id,
        document_name: document.information.document_name,
        document_version: document.information.document_version,
        n_plugins: 0,
    };
    if let Err(e) = uploader.upload(&result).await {
        tracing::error!(error = %e, "docd: failed to upload cancel-command result");
    }
}
