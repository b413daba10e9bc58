// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the IPC channel, messaging loop, and executers.
#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("protocol error: {0}")]
    Protocol(#[from] doc_wire::ProtocolError),

    #[error("storage error: {0}")]
    Storage(#[from] doc_storage::StoreError),

    #[error("adapter error: {0}")]
    Adapter(#[from] doc_adapters::AdapterError),

    #[error("document error: {0}")]
    Document(#[from] doc_core::DocumentError),

    #[error("channel io error at {path}: {source}")]
    ChannelIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("messaging loop timed out")]
    Timeout,

    #[error("worker process {0} is gone and the channel was orphaned (orphan dead)")]
    OrphanDead(u32),

    #[error("reply referenced unknown plugin id {0:?}")]
    UnknownPlugin(String),
}
