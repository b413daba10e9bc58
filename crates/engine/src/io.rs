// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The IO Handler (§4.11): per-plugin stdout/stderr capture, fanned out to
//! a set of sinks (a file on disk plus an in-memory buffer), and the
//! balanced-truncation rule applied when a plugin's combined output is
//! folded into its [`doc_core::PluginResult::output`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::ExecuteError;

/// Hard cap on a plugin's folded output, per §4.11.
pub const MAXIMUM_PLUGIN_OUTPUT_SIZE: usize = 2500;

const ERROR_HEADER: &str = "\n----------ERROR-------\n";
const OUTPUT_TRUNCATED_SUFFIX: &str = "\n---Output truncated---";
const ERROR_TRUNCATED_SUFFIX: &str = "\n---Error truncated----";

/// One registered sink: a background task draining an mpsc channel of
/// chunks into wherever the sink actually writes.
struct Sink {
    tx: mpsc::Sender<Vec<u8>>,
    task: JoinHandle<()>,
}

/// Forwards every write to each of its registered sinks. Each sink runs
/// its own reader loop in a background task so a slow sink never blocks
/// the others.
#[derive(Default)]
pub struct DocumentIoMultiWriter {
    sinks: Vec<Sink>,
}

impl DocumentIoMultiWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a file sink at `path`, creating parent directories first.
    pub async fn register_file(&mut self, path: impl Into<PathBuf>) -> Result<(), ExecuteError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| ExecuteError::ChannelIo { path: parent.to_path_buf(), source })?;
        }
        let mut file = tokio::fs::File::create(&path)
            .await
            .map_err(|source| ExecuteError::ChannelIo { path: path.clone(), source })?;

        let (tx, mut rx) = mpsc::channel::<Vec<u8>>(64);
        let task = tokio::spawn(async move {
            while let Some(chunk) = rx.recv().await {
                if let Err(e) = file.write_all(&chunk).await {
                    tracing::warn!(error = %e, "io handler: file sink write failed");
                    break;
                }
            }
            let _ = file.flush().await;
        });
        self.sinks.push(Sink { tx, task });
        Ok(())
    }

    /// Registers an in-memory sink, returning a handle readable after
    /// [`DocumentIoMultiWriter::close`].
    pub fn register_buffer(&mut self) -> Arc<Mutex<Vec<u8>>> {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let sink_buffer = Arc::clone(&buffer);

        let (tx, mut rx) = mpsc::channel::<Vec<u8>>(64);
        let task = tokio::spawn(async move {
            while let Some(chunk) = rx.recv().await {
                sink_buffer.lock().extend_from_slice(&chunk);
            }
        });
        self.sinks.push(Sink { tx, task });
        buffer
    }

    /// Forwards `bytes` to every registered sink.
    pub async fn write(&self, bytes: &[u8]) {
        for sink in &self.sinks {
            let _ = sink.tx.send(bytes.to_vec()).await;
        }
    }

    /// Closes every sink's pipe and waits for its reader task to finish.
    pub async fn close(self) {
        for sink in self.sinks {
            drop(sink.tx);
            let _ = sink.task.await;
        }
    }
}

/// The per-plugin writer bundle presented to a plugin while it runs:
/// stdout/stderr multi-writers plus the in-memory buffers used to build
/// the final folded `output` string.
pub struct IoHandler {
    stdout: DocumentIoMultiWriter,
    stderr: DocumentIoMultiWriter,
    stdout_buffer: Arc<Mutex<Vec<u8>>>,
    stderr_buffer: Arc<Mutex<Vec<u8>>>,
}

impl IoHandler {
    /// Creates the plugin's output directory tree and registers the
    /// default sinks: a file at `<subpath>/stdout` / `<subpath>/stderr`
    /// plus an in-memory buffer of the same stream.
    pub async fn init(subpath: &Path) -> Result<Self, ExecuteError> {
        let mut stdout = DocumentIoMultiWriter::new();
        let mut stderr = DocumentIoMultiWriter::new();
        stdout.register_file(subpath.join("stdout")).await?;
        stderr.register_file(subpath.join("stderr")).await?;
        let stdout_buffer = stdout.register_buffer();
        let stderr_buffer = stderr.register_buffer();
        Ok(Self { stdout, stderr, stdout_buffer, stderr_buffer })
    }

    /// Routes bytes to the stdout multiwriter.
    pub async fn append_info(&self, bytes: &[u8]) {
        self.stdout.write(bytes).await;
    }

    /// Routes bytes to the stderr multiwriter.
    pub async fn append_error(&self, bytes: &[u8]) {
        self.stderr.write(bytes).await;
    }

    /// Closes every sink, then folds the captured stdout/stderr into the
    /// final truncated `output` string (§4.11).
    pub async fn close(self) -> String {
        let stdout = String::from_utf8_lossy(&self.stdout_buffer.lock()).into_owned();
        let stderr = String::from_utf8_lossy(&self.stderr_buffer.lock()).into_owned();
        self.stdout.close().await;
        self.stderr.close().await;
        combine_truncated(&stdout, &stderr)
    }
}

/// Concatenates `stdout` and `stderr` behind the standard error header,
/// applying the balanced-truncation rule: if both streams individually
/// exceed half of [`MAXIMUM_PLUGIN_OUTPUT_SIZE`], each is truncated to
/// half; otherwise only the longer of the two is truncated, down to
/// whatever budget the shorter stream left unused.
pub fn combine_truncated(stdout: &str, stderr: &str) -> String {
    let budget = MAXIMUM_PLUGIN_OUTPUT_SIZE;
    let half = budget / 2;

    let (out, err) = if stdout.len() > half && stderr.len() > half {
        (truncate_with_suffix(stdout, half, OUTPUT_TRUNCATED_SUFFIX), truncate_with_suffix(stderr, half, ERROR_TRUNCATED_SUFFIX))
    } else if stdout.len() + stderr.len() <= budget {
        (stdout.to_string(), stderr.to_string())
    } else if stdout.len() >= stderr.len() {
        let remaining = budget.saturating_sub(stderr.len());
        (truncate_with_suffix(stdout, remaining, OUTPUT_TRUNCATED_SUFFIX), stderr.to_string())
    } else {
        let remaining = budget.saturating_sub(stdout.len());
        (stdout.to_string(), truncate_with_suffix(stderr, remaining, ERROR_TRUNCATED_SUFFIX))
    };

    format!("{out}{ERROR_HEADER}{err}")
}

fn truncate_with_suffix(s: &str, max_len: usize, suffix: &str) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut end = max_len.min(s.len());
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}{}", &s[..end], suffix)
}

#[cfg(test)]
#[path = "io_tests.rs"]
mod tests;
