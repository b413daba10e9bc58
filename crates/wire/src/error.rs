// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors raised marshaling or unmarshaling a [`crate::Datagram`].
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("unsupported message type: {0}")]
    UnsupportedType(String),

    #[error("unsupported wire version: {0}")]
    UnsupportedVersion(String),

    #[error("malformed datagram: {0}")]
    Malformed(#[from] serde_json::Error),
}
