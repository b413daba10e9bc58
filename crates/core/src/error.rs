// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors shared by the core data model.

use thiserror::Error;

/// Errors raised while building or mutating a [`crate::document::DocumentState`].
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("unsupported schema version: {0}")]
    UnsupportedSchemaVersion(String),

    #[error("unknown document type: {0}")]
    UnknownDocumentType(String),

    #[error("plugin id {0:?} not found in document")]
    UnknownPlugin(String),

    #[error("plugin {0:?} result already sealed, write-once violation")]
    ResultAlreadySealed(String),

    #[error("document has no cancel information but is a cancel document")]
    MissingCancelInformation,
}
