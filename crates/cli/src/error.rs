// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to read document file {path:?}: {source}")]
    ReadDocument { path: PathBuf, #[source] source: std::io::Error },

    #[error("unrecognized document file extension {0:?} (expected .json or .yaml/.yml)")]
    UnknownExtension(String),

    #[error("malformed --param {0:?} (expected KEY=VALUE)")]
    MalformedParam(String),

    #[error(transparent)]
    Parse(#[from] doc_parser::ParseError),

    #[error(transparent)]
    Document(#[from] doc_core::DocumentError),

    #[error(transparent)]
    Store(#[from] doc_storage::error::StoreError),

    #[error(transparent)]
    Config(#[from] doc_agent::ConfigError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("failed to write document to inbox at {path:?}: {source}")]
    WriteInbox { path: PathBuf, #[source] source: std::io::Error },
}
