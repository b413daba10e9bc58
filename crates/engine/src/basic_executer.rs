// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Basic Executer (§4.7): runs a document's plugins in-process, with
//! no IPC, fanning out a `DocumentResult` after every plugin result. Its
//! result-channel contract is observationally identical to the
//! Out-of-Proc Executer's.

use std::sync::Arc;

use async_trait::async_trait;
use doc_adapters::PluginRunner;
use doc_core::{aggregate, CancelObserver, DocumentId, DocumentResult, DocumentState, InstanceId, PluginId, PluginResult};
use doc_storage::DocumentStore;
use indexmap::IndexMap;
use tokio::sync::mpsc;

use crate::error::ExecuteError;
use crate::Executer;

pub struct BasicExecuter<S: DocumentStore, R: PluginRunner> {
    store: Arc<S>,
    runner: Arc<R>,
}

impl<S: DocumentStore, R: PluginRunner> BasicExecuter<S, R> {
    pub fn new(store: Arc<S>, runner: Arc<R>) -> Self {
        Self { store, runner }
    }
}

#[derive(Clone)]
struct DocumentFields {
    message_id: doc_core::MessageId,
    association_id: Option<doc_core::AssociationId>,
    document_name: String,
    document_version: String,
}

impl DocumentFields {
    fn from(document: &DocumentState) -> Self {
        Self {
            message_id: document.information.message_id,
            association_id: document.information.association_id,
            document_name: document.information.document_name.clone(),
            document_version: document.information.document_version.clone(),
        }
    }

    fn result(&self, status: doc_core::Status, plugin_results: IndexMap<PluginId, PluginResult>, last_plugin: Option<PluginId>, n_plugins: usize) -> DocumentResult {
        DocumentResult {
            status,
            plugin_results,
            last_plugin,
            message_id: self.message_id,
            association_id: self.association_id,
            document_name: self.document_name.clone(),
            document_version: self.document_version.clone(),
            n_plugins,
        }
    }
}

#[async_trait]
impl<S, R> Executer for BasicExecuter<S, R>
where
    S: DocumentStore + 'static,
    R: PluginRunner + 'static,
{
    async fn run(&self, instance_id: InstanceId, document_id: DocumentId, cancel: CancelObserver) -> Result<mpsc::Receiver<DocumentResult>, ExecuteError> {
        let document = self.store.load(&instance_id, &document_id).await?;
        let total_plugins = document.plugins.len();
        let fields = DocumentFields::from(&document);

        let (result_tx, result_rx) = mpsc::channel(total_plugins.max(1) + 1);
        let (plugin_tx, mut plugin_rx) = mpsc::channel::<PluginResult>(total_plugins.max(1));

        let store = Arc::clone(&self.store);
        let runner = Arc::clone(&self.runner);

        tokio::spawn(async move {
            let mut document = document;

            let listener = {
                let result_tx = result_tx.clone();
                let fields = fields.clone();
                tokio::spawn(async move {
                    let mut results: IndexMap<PluginId, PluginResult> = IndexMap::new();
                    while let Some(result) = plugin_rx.recv().await {
                        let plugin_id = result.plugin_id.clone();
                        results.insert(plugin_id.clone(), result);
                        let fold = aggregate(Some(&plugin_id), &results, total_plugins);
                        let update = fields.result(fold.status, results.clone(), Some(plugin_id), total_plugins);
                        if result_tx.send(update).await.is_err() {
                            break;
                        }
                    }
                    results
                })
            };

            if let Err(e) = runner.run(&document, plugin_tx, cancel).await {
                tracing::warn!(error = %e, "basic executer: plugin runner returned an error");
            }

            let results = match listener.await {
                Ok(results) => results,
                Err(_) => {
                    tracing::error!("basic executer: plugin listener panicked");
                    IndexMap::new()
                }
            };

            let fold = aggregate(None, &results, total_plugins);
            for (id, result) in &results {
                if let Some(plugin) = document.plugin_mut(id) {
                    plugin.result = Some(result.clone());
                }
            }
            document.information.document_status = fold.status;

            let final_update = fields.result(fold.status, results, None, total_plugins);
            let _ = result_tx.send(final_update).await;

            if let Err(e) = store.save(&instance_id, &document).await {
                tracing::error!(error = %e, "basic executer: failed to persist final document state");
            }
        });

        Ok(result_rx)
    }
}

#[cfg(test)]
#[path = "basic_executer_tests.rs"]
mod tests;
