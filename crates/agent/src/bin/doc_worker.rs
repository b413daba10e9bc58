// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-document worker subprocess: connects its end of the IPC
//! channel, starts the Messaging Loop with a [`WorkerBackend`] hosting
//! [`ShellPluginRunner`], and exits 0 on graceful termination (non-zero
//! means the master should treat the document as `Failed`, per §6's CLI
//! surface).
//!
//! Invoked as `doc-worker --mode <document|session> <documentID>
//! <instanceID>` (the argv [`doc_engine::out_of_proc::OutOfProcExecuter`]
//! spawns with). An unrecognized argument count exits 1 with a
//! human-readable stderr message rather than panicking.

use std::path::PathBuf;
use std::sync::Arc;

use doc_engine::messaging::run_messaging_loop;
use doc_engine::backend_worker::WorkerBackend;
use doc_engine::channel::Channel;
use doc_engine::sequence::Role;
use doc_engine::ShellPluginRunner;
use tokio::sync::mpsc;

struct WorkerArgs {
    document_id: String,
}

fn parse_args(argv: &[String]) -> Result<WorkerArgs, String> {
    // `--mode <document|session> <documentID> <instanceID>`, per
    // `OutOfProcExecuter::worker_argv`. The mode flag and instance id are
    // accepted but unused here: a shell-command plugin has no need to
    // distinguish a document worker from a session worker, and the
    // instance id is only needed to locate the document store, which this
    // binary never touches (the master persists state, not the worker).
    if argv.len() != 4 || argv[0] != "--mode" {
        return Err(format!(
            "usage: doc-worker --mode <document|session> <documentID> <instanceID> (got {} argument(s))",
            argv.len()
        ));
    }
    Ok(WorkerArgs { document_id: argv[2].clone() })
}

#[tokio::main]
async fn main() {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    let args = match parse_args(&argv) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("doc-worker: {message}");
            std::process::exit(1);
        }
    };

    let config_path = std::env::var("DOCD_CONFIG").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("docd.toml"));
    let config = match doc_agent::AgentConfig::load(&config_path) {
        Ok(c) => c,
        Err(_) => doc_agent::AgentConfig::default(),
    };

    let _guard = doc_agent::init_tracing(&config.orchestration_root.join("logs"), "doc-worker");
    let span = tracing::info_span!("worker", role = "worker", document_id = %args.document_id);
    let _enter = span.enter();
    tracing::info!("doc-worker starting");

    let channel = match Channel::open(&config.ipc_root, &args.document_id, Role::Worker).await {
        Ok(channel) => channel,
        Err(e) => {
            tracing::error!(error = %e, "doc-worker: failed to open ipc channel");
            std::process::exit(1);
        }
    };

    let (accept_tx, accept_rx) = mpsc::channel(32);
    let (stop_tx, stop_rx) = mpsc::channel(8);
    let runner = Arc::new(ShellPluginRunner::new());
    let backend = WorkerBackend::new(runner, accept_tx, stop_tx);

    match run_messaging_loop(channel, backend, stop_rx, accept_rx, config.stop_timer).await {
        Ok(()) => {
            tracing::info!("doc-worker: messaging loop ended gracefully");
            std::process::exit(0);
        }
        Err(e) => {
            tracing::error!(error = %e, "doc-worker: messaging loop ended with an error");
            std::process::exit(1);
        }
    }
}
