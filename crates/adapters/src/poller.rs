// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The network poller contract (§1): explicitly out of scope here to
//! implement against the real cloud control plane — it fetches documents
//! from there and hands them to an Executer. Named so downstream code can
//! depend on the interface without this core providing a production cloud
//! backend.
//!
//! [`FileSystemPoller`] is the one production implementation this core
//! does ship: an inbox-directory poller so `docd` has a genuine, runnable
//! default before a real cloud poller is wired in.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use doc_core::DocumentState;

use crate::error::AdapterError;

#[async_trait]
pub trait Poller: Send + Sync {
    /// Blocks until the next document is available, or returns an error if
    /// polling fails.
    async fn next_document(&self) -> Result<DocumentState, AdapterError>;
}

/// Polls an inbox directory for `DocumentState` JSON files, oldest first
/// by filename, moving each picked-up file into a `processed/` sibling
/// directory so a restart never redelivers it.
pub struct FileSystemPoller {
    inbox: PathBuf,
    processed: PathBuf,
    poll_interval: Duration,
}

impl FileSystemPoller {
    pub fn new(inbox: impl Into<PathBuf>, poll_interval: Duration) -> Self {
        let inbox = inbox.into();
        let processed = inbox.join("processed");
        Self { inbox, processed, poll_interval }
    }

    async fn next_file(&self) -> Result<PathBuf, AdapterError> {
        loop {
            let mut entries = tokio::fs::read_dir(&self.inbox)
                .await
                .map_err(|e| AdapterError::Poller(format!("reading inbox {:?}: {e}", self.inbox)))?;

            let mut candidates = Vec::new();
            while let Some(entry) =
                entries.next_entry().await.map_err(|e| AdapterError::Poller(e.to_string()))?
            {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) == Some("json") {
                    candidates.push(path);
                }
            }
            candidates.sort();

            if let Some(path) = candidates.into_iter().next() {
                return Ok(path);
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

#[async_trait]
impl Poller for FileSystemPoller {
    async fn next_document(&self) -> Result<DocumentState, AdapterError> {
        let path = self.next_file().await?;
        let raw = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| AdapterError::Poller(format!("reading {path:?}: {e}")))?;
        let document: DocumentState = serde_json::from_str(&raw)
            .map_err(|e| AdapterError::Poller(format!("malformed document at {path:?}: {e}")))?;

        tokio::fs::create_dir_all(&self.processed)
            .await
            .map_err(|e| AdapterError::Poller(e.to_string()))?;
        let Some(name) = path.file_name() else {
            return Err(AdapterError::Poller(format!("candidate path {path:?} has no file name")));
        };
        let dest = self.processed.join(name);
        tokio::fs::rename(&path, &dest).await.map_err(|e| AdapterError::Poller(e.to_string()))?;

        Ok(document)
    }
}

#[cfg(test)]
#[path = "poller_tests.rs"]
mod tests;
