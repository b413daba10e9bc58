// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `docd`/`doc-worker` process configuration (§6): orchestration root, IPC
//! root, schema-version allowlist, stop-timer duration, process start-time
//! tolerance. Loaded once at startup into a read-only `Arc<AgentConfig>`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Read { path: PathBuf, #[source] source: std::io::Error },

    #[error("failed to parse config file {path:?}: {source}")]
    Parse { path: PathBuf, #[source] source: toml::de::Error },
}

/// On-disk shape of the TOML config file; every field has a production
/// default so an empty file is a valid (if minimal) configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawConfig {
    orchestration_root: PathBuf,
    ipc_root: PathBuf,
    inbox_root: PathBuf,
    outbox_root: PathBuf,
    worker_binary: PathBuf,
    schema_version_allowlist: Vec<String>,
    stop_timer_secs: u64,
    process_start_time_tolerance_secs: u64,
    poll_interval_millis: u64,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            orchestration_root: PathBuf::from("/var/lib/docd/orchestration"),
            ipc_root: PathBuf::from("/var/lib/docd/ipc"),
            inbox_root: PathBuf::from("/var/lib/docd/inbox"),
            outbox_root: PathBuf::from("/var/lib/docd/outbox"),
            worker_binary: PathBuf::from("doc-worker"),
            schema_version_allowlist: vec![
                "1.0".to_string(),
                "1.2".to_string(),
                "2.0".to_string(),
                "2.0.1".to_string(),
                "2.0.2".to_string(),
                "2.0.3".to_string(),
                "2.2".to_string(),
            ],
            stop_timer_secs: 30,
            process_start_time_tolerance_secs: 0,
            poll_interval_millis: 500,
        }
    }
}

/// Process-wide identity/config bundle, the one piece of global state
/// named in §5: initialized once at startup, read-only thereafter.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub orchestration_root: PathBuf,
    pub ipc_root: PathBuf,
    pub inbox_root: PathBuf,
    pub outbox_root: PathBuf,
    pub worker_binary: PathBuf,
    pub schema_version_allowlist: Vec<String>,
    pub stop_timer: Duration,
    pub process_start_time_tolerance: Duration,
    pub poll_interval: Duration,
}

impl AgentConfig {
    /// Loads config from `path`, falling back to defaults for any field
    /// the file does not set. Missing file is itself an error — callers
    /// that want a default-only config can point at an empty file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        Self::parse(&raw, path)
    }

    fn parse(raw: &str, path: &Path) -> Result<Self, ConfigError> {
        let raw: RawConfig =
            toml::from_str(raw).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
        Ok(Self::from_raw(raw))
    }

    fn from_raw(raw: RawConfig) -> Self {
        Self {
            orchestration_root: raw.orchestration_root,
            ipc_root: raw.ipc_root,
            inbox_root: raw.inbox_root,
            outbox_root: raw.outbox_root,
            worker_binary: raw.worker_binary,
            schema_version_allowlist: raw.schema_version_allowlist,
            stop_timer: Duration::from_secs(raw.stop_timer_secs),
            process_start_time_tolerance: Duration::from_secs(raw.process_start_time_tolerance_secs),
            poll_interval: Duration::from_millis(raw.poll_interval_millis),
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self::from_raw(RawConfig::default())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
