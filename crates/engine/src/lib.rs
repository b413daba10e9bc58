// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! The IPC channel, messaging loop, executer backends, result aggregator
//! plumbing, and both executer implementations (in-process and
//! out-of-process) that make up the document execution core.

use async_trait::async_trait;
use doc_core::{CancelObserver, DocumentId, DocumentResult, InstanceId};
use tokio::sync::mpsc;

pub mod backend_executer;
pub mod backend_worker;
pub mod basic_executer;
pub mod channel;
pub mod error;
pub mod io;
pub mod messaging;
pub mod out_of_proc;
pub mod sequence;
pub mod shell_runner;

pub use basic_executer::BasicExecuter;
pub use error::ExecuteError;
pub use io::IoHandler;
pub use out_of_proc::{OutOfProcConfig, OutOfProcExecuter, WorkerKind};
pub use shell_runner::ShellPluginRunner;

/// Runs one document to completion and streams every status update on the
/// returned channel, per §4.7/§4.6. The final update (`last_plugin ==
/// None`) is always the last value sent before the channel closes.
#[async_trait]
pub trait Executer: Send + Sync {
    async fn run(
        &self,
        instance_id: InstanceId,
        document_id: DocumentId,
        cancel: CancelObserver,
    ) -> Result<mpsc::Receiver<DocumentResult>, ExecuteError>;
}
