// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors raised by the pluggable external interfaces and the process
/// adapter.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("failed to spawn {name:?}: {source}")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to wait on process {0}: {1}")]
    Wait(u32, std::io::Error),

    #[error("parameter {0:?} not found in parameter store")]
    ParameterNotFound(String),

    #[error("poller error: {0}")]
    Poller(String),

    #[error("uploader error: {0}")]
    Uploader(String),

    #[error("plugin runner error: {0}")]
    Runner(String),
}
