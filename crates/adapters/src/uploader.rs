// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The cloud reply uploader contract (§1): explicitly out of scope to wire
//! up against the real control plane — ships a `DocumentResult` back to
//! it. Named so the rest of this core can depend on the interface.
//!
//! [`FileSystemUploader`] is the one production implementation this core
//! ships: it drops each result as JSON into an outbox directory, giving
//! `docd` a genuine, runnable default before a real cloud uploader exists.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use doc_core::DocumentResult;

use crate::error::AdapterError;

#[async_trait]
pub trait Uploader: Send + Sync {
    async fn upload(&self, result: &DocumentResult) -> Result<(), AdapterError>;
}

/// Writes every uploaded result as a JSON file in `outbox`, one file per
/// call (a document's final update does not overwrite its intermediate
/// ones, so a consumer can replay the whole stream).
pub struct FileSystemUploader {
    outbox: PathBuf,
    sequence: AtomicU64,
}

impl FileSystemUploader {
    pub fn new(outbox: impl Into<PathBuf>) -> Self {
        Self { outbox: outbox.into(), sequence: AtomicU64::new(0) }
    }
}

#[async_trait]
impl Uploader for FileSystemUploader {
    async fn upload(&self, result: &DocumentResult) -> Result<(), AdapterError> {
        tokio::fs::create_dir_all(&self.outbox).await.map_err(|e| AdapterError::Uploader(e.to_string()))?;

        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        let file_name = format!("{}-{:010}.json", result.message_id, seq);
        let body = serde_json::to_vec_pretty(result)
            .map_err(|e| AdapterError::Uploader(format!("marshaling result: {e}")))?;

        let dest = self.outbox.join(file_name);
        let tmp = self.outbox.join(format!(".{}.tmp", seq));
        tokio::fs::write(&tmp, &body).await.map_err(|e| AdapterError::Uploader(e.to_string()))?;
        tokio::fs::rename(&tmp, &dest).await.map_err(|e| AdapterError::Uploader(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
#[path = "uploader_tests.rs"]
mod tests;
