// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The file-watcher IPC channel (§4.1): an ordered, atomic, bidirectional
//! transport between a master and a worker over a shared directory.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use notify::{Event as NotifyEvent, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{mpsc, Mutex as AsyncMutex};
use tokio::task::JoinHandle;

use crate::error::ExecuteError;
use crate::sequence::{self, Role};

/// One open endpoint of a two-party file-watcher channel.
///
/// Exactly one `Channel` should exist per `(handle, role)` pair at a time;
/// the grammar in [`sequence`] relies on a single sender-local counter per
/// role, which this struct owns.
pub struct Channel {
    role: Role,
    found: bool,
    dir: PathBuf,
    tmp_dir: PathBuf,
    send_counter: AtomicU64,
    inbound_rx: AsyncMutex<mpsc::Receiver<String>>,
    drain_task: JoinHandle<()>,
    // Kept alive for the lifetime of the channel; dropping it stops the watch.
    _watcher: RecommendedWatcher,
}

impl Channel {
    /// Opens (creating if absent) the channel directory for `handle`.
    ///
    /// Returns the channel along with `found`: whether the directory already
    /// existed, which tells the caller whether a peer endpoint predates this
    /// one (e.g. an orphaned worker from a prior master).
    pub async fn open(root: &Path, handle: &str, role: Role) -> Result<Channel, ExecuteError> {
        let dir = root.join(handle);
        let tmp_dir = dir.join("tmp");
        let found = tokio::fs::metadata(&dir).await.is_ok();

        tokio::fs::create_dir_all(&tmp_dir)
            .await
            .map_err(|source| ExecuteError::ChannelIo { path: tmp_dir.clone(), source })?;

        let (inbound_tx, inbound_rx) = mpsc::channel(256);

        // Drain whatever is already on disk before the watcher starts, so
        // nothing sent before `open` is missed between listing and watching.
        drain_available(&dir, role, &inbound_tx).await?;

        let (rescan_tx, mut rescan_rx) = mpsc::channel::<()>(16);
        let watch_dir = dir.clone();
        let mut watcher = notify::recommended_watcher(move |res: Result<NotifyEvent, notify::Error>| {
            if let Ok(event) = res {
                if matches!(event.kind, EventKind::Create(_)) {
                    let _ = rescan_tx.blocking_send(());
                }
            }
        })
        .map_err(|source| ExecuteError::ChannelIo {
            path: watch_dir.clone(),
            source: std::io::Error::other(source),
        })?;
        watcher
            .watch(&watch_dir, RecursiveMode::NonRecursive)
            .map_err(|source| ExecuteError::ChannelIo {
                path: watch_dir.clone(),
                source: std::io::Error::other(source),
            })?;

        let drain_dir = dir.clone();
        let drain_inbound = inbound_tx;
        let drain_task = tokio::spawn(async move {
            // Every `CREATE` notification triggers a full rescan rather than
            // trying to consume only the one file that arrived: a rescan is
            // always correct (self-healing against out-of-order events) and
            // channel directories stay small, so the extra listing is cheap.
            while rescan_rx.recv().await.is_some() {
                if let Err(e) = drain_available(&drain_dir, role, &drain_inbound).await {
                    tracing::warn!(error = %e, "ipc channel rescan failed");
                }
            }
        });

        Ok(Channel {
            role,
            found,
            dir,
            tmp_dir,
            send_counter: AtomicU64::new(0),
            inbound_rx: AsyncMutex::new(inbound_rx),
            drain_task,
            _watcher: watcher,
        })
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Whether the channel directory already existed when this endpoint
    /// opened it (signals a peer from an earlier process is already using
    /// this handle).
    pub fn found(&self) -> bool {
        self.found
    }

    /// Writes `payload` to `tmp/` then atomically renames it into place.
    /// Queuing is implicit: the write happens inline, but the caller does
    /// not wait for the peer to observe it.
    pub async fn send(&self, payload: &str) -> Result<(), ExecuteError> {
        let counter = self.send_counter.fetch_add(1, Ordering::SeqCst) + 1;
        let name = sequence::format_name(self.role, Utc::now(), counter);
        let tmp_path = self.tmp_dir.join(&name);
        let final_path = self.dir.join(&name);

        tokio::fs::write(&tmp_path, payload.as_bytes())
            .await
            .map_err(|source| ExecuteError::ChannelIo { path: tmp_path.clone(), source })?;
        tokio::fs::rename(&tmp_path, &final_path)
            .await
            .map_err(|source| ExecuteError::ChannelIo { path: final_path, source })
    }

    /// Awaits the next inbound payload, or `None` once the channel is closed.
    pub async fn recv(&self) -> Option<String> {
        self.inbound_rx.lock().await.recv().await
    }

    /// Releases the watcher and closes the receive queue. Leaves files in
    /// place; only [`Channel::destroy`] removes the directory.
    pub fn close(&mut self) {
        self.drain_task.abort();
    }

    /// Closes, then removes the channel directory. Only the master should
    /// call this.
    pub async fn destroy(mut self) -> Result<(), ExecuteError> {
        self.close();
        match tokio::fs::remove_dir_all(&self.dir).await {
            Ok(()) => Ok(()),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(ExecuteError::ChannelIo { path: self.dir.clone(), source }),
        }
    }
}

/// Lists `dir`, filters out `tmp` and this role's own sent files, sorts
/// lexicographically (equivalent to sequence order, since names share a
/// fixed-width timestamp and counter), and consumes every readable file.
async fn drain_available(
    dir: &Path,
    role: Role,
    inbound_tx: &mpsc::Sender<String>,
) -> Result<(), ExecuteError> {
    let mut names = Vec::new();
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|source| ExecuteError::ChannelIo { path: dir.to_path_buf(), source })?;
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|source| ExecuteError::ChannelIo { path: dir.to_path_buf(), source })?
    {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name == "tmp" || sequence::is_own_role(&name, role) {
            continue;
        }
        names.push(name);
    }
    names.sort();

    for name in names {
        let path = dir.join(&name);
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                if let Err(e) = tokio::fs::remove_file(&path).await {
                    tracing::warn!(file = %name, error = %e, "ipc channel failed to remove consumed file");
                }
                match String::from_utf8(bytes) {
                    Ok(payload) => {
                        let _ = inbound_tx.send(payload).await;
                    }
                    Err(_) => tracing::warn!(file = %name, "ipc channel skipped a non-utf8 file"),
                }
            }
            Err(e) => {
                tracing::warn!(file = %name, error = %e, "ipc channel failed to read a file, skipping");
            }
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "channel_tests.rs"]
mod tests;
