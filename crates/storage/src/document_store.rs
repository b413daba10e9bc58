// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `DocumentStore` contract and its on-disk implementation.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use doc_core::{DocumentId, DocumentState, InstanceId};

use crate::error::StoreError;

/// Persists and loads a [`DocumentState`] across master restarts.
///
/// `load` must not mutate disk state; `save` is an atomic replace, so a
/// crash mid-write never leaves a torn file visible to a subsequent
/// `load`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn load(&self, instance_id: &InstanceId, document_id: &DocumentId) -> Result<DocumentState, StoreError>;
    async fn save(&self, instance_id: &InstanceId, state: &DocumentState) -> Result<(), StoreError>;
}

/// Filesystem-backed [`DocumentStore`].
///
/// Layout (relative to `root`):
/// `<root>/<instance-id>/document/current/<document-id>/state.json`
pub struct FileDocumentStore {
    root: PathBuf,
}

impl FileDocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn document_dir(&self, instance_id: &InstanceId, document_id: &DocumentId) -> PathBuf {
        self.root
            .join(instance_id.as_str())
            .join("document")
            .join("current")
            .join(document_id.as_str())
    }

    fn state_path(&self, instance_id: &InstanceId, document_id: &DocumentId) -> PathBuf {
        self.document_dir(instance_id, document_id).join("state.json")
    }

    fn io_error(path: &Path, source: std::io::Error) -> StoreError {
        StoreError::Io { path: path.display().to_string(), source }
    }
}

#[async_trait]
impl DocumentStore for FileDocumentStore {
    async fn load(&self, instance_id: &InstanceId, document_id: &DocumentId) -> Result<DocumentState, StoreError> {
        let path = self.state_path(instance_id, document_id);
        let raw = tokio::fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StoreError::NotFound(path.display().to_string())
            } else {
                Self::io_error(&path, e)
            }
        })?;
        serde_json::from_slice(&raw).map_err(|source| StoreError::Malformed {
            path: path.display().to_string(),
            source,
        })
    }

    async fn save(&self, instance_id: &InstanceId, state: &DocumentState) -> Result<(), StoreError> {
        let dir = self.document_dir(instance_id, &state.information.document_id);
        tokio::fs::create_dir_all(&dir).await.map_err(|e| Self::io_error(&dir, e))?;

        let final_path = dir.join("state.json");
        let tmp_path = dir.join(format!("state.json.tmp-{}", state.information.run_count));

        let body = serde_json::to_vec_pretty(state).map_err(|source| StoreError::Malformed {
            path: tmp_path.display().to_string(),
            source,
        })?;
        tokio::fs::write(&tmp_path, &body).await.map_err(|e| Self::io_error(&tmp_path, e))?;
        tokio::fs::rename(&tmp_path, &final_path).await.map_err(|e| Self::io_error(&final_path, e))?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "document_store_tests.rs"]
mod tests;
