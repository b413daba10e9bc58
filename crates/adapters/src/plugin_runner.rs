// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `PluginRunner` contract (§6): plugged in by the application, not
//! implemented here. Individual plugin implementations (shell runner,
//! file download, inventory collector) are explicitly out of scope.

use async_trait::async_trait;
use doc_core::{CancelObserver, DocumentState, PluginResult};
use tokio::sync::mpsc;

use crate::error::AdapterError;

/// Runs every plugin step in `document`, in document order, emitting one
/// [`PluginResult`] per step to `results` as it completes, then dropping
/// `results` to signal the run is done. Must observe `cancel` at its next
/// suspension point.
#[async_trait]
pub trait PluginRunner: Send + Sync {
    async fn run(
        &self,
        document: &DocumentState,
        results: mpsc::Sender<PluginResult>,
        cancel: CancelObserver,
    ) -> Result<(), AdapterError>;
}
