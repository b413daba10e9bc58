// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tracing` subscriber setup (§6): env-filter driven verbosity, plus a
//! rolling file appender for the daemon's own log, so logs from both
//! `docd` and `doc-worker` carry the document id and role as structured
//! fields and can be correlated across processes.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Initializes the global `tracing` subscriber. The returned `WorkerGuard`
/// must be held for the lifetime of the process (dropping it stops the
/// background flush thread), so callers keep it bound in `main`.
pub fn init_tracing(log_dir: &Path, file_prefix: &str) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::daily(log_dir, file_prefix);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();

    guard
}
