// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors raised turning a [`crate::DocumentContent`] into an ordered
/// sequence of `PluginState`.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unsupported schema version: {0}")]
    UnsupportedSchemaVersion(String),

    #[error("required parameter {0:?} has no value and no default")]
    MissingRequiredParameter(String),

    #[error("parameter {name:?} expects type {expected}, got {actual}")]
    ParameterTypeMismatch { name: String, expected: &'static str, actual: &'static str },

    #[error("unresolved parameter reference {0:?}")]
    UnresolvedReference(String),

    #[error("secure parameter {name:?} could not be resolved: {source}")]
    SecureParameter { name: String, source: doc_adapters::AdapterError },

    #[error("malformed document content: {0}")]
    Malformed(String),

    #[error("yaml parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("json parse error: {0}")]
    Json(#[from] serde_json::Error),
}
