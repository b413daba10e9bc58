// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Process Adapter (§4.10): spawn, wait, and find-by-pid-and-start-time.

use std::process::Stdio;

use async_trait::async_trait;
use doc_core::ProcInfo;
use sysinfo::{Pid, System};
use tokio::process::{Child, Command};

use crate::error::AdapterError;

/// Tuning for [`StdProcessAdapter::find_by_pid_and_start_time`] (§9's open
/// question on process-start-time granularity). Default is an exact match;
/// widen only if the deployment's clock source is known to be coarser than
/// a second.
#[derive(Debug, Clone, Copy)]
pub struct ProcessAdapterConfig {
    pub start_time_tolerance_secs: u64,
}

impl Default for ProcessAdapterConfig {
    fn default() -> Self {
        Self { start_time_tolerance_secs: 0 }
    }
}

/// A spawned child process plus the `{Pid, StartTime}` pair recorded for
/// reattachment.
pub struct ProcessHandle {
    child: Child,
    pub proc_info: ProcInfo,
}

impl ProcessHandle {
    pub fn proc_info(&self) -> ProcInfo {
        self.proc_info
    }
}

#[async_trait]
pub trait ProcessAdapter: Send + Sync {
    async fn spawn(&self, name: &str, argv: &[String]) -> Result<ProcessHandle, AdapterError>;

    /// Blocks until the child terminates and reaps it. Tolerates the child
    /// already having been reaped (`ECHILD`) as success, since a
    /// reattaching master can race the original waiter.
    async fn wait(&self, handle: &mut ProcessHandle) -> Result<(), AdapterError>;

    /// Compares both pid and start time; a pid match alone is never
    /// authoritative because pids are reused.
    fn find_by_pid_and_start_time(&self, pid: u32, start_time: u64) -> bool;
}

fn process_start_time(system: &mut System, pid: u32) -> Option<u64> {
    let sys_pid = Pid::from_u32(pid);
    system.refresh_process(sys_pid);
    system.process(sys_pid).map(|process| process.start_time())
}

/// A [`ProcessAdapter`] backed by `tokio::process` for spawn/wait and
/// `sysinfo` for process-table lookups.
pub struct StdProcessAdapter {
    config: ProcessAdapterConfig,
}

impl StdProcessAdapter {
    pub fn new(config: ProcessAdapterConfig) -> Self {
        Self { config }
    }
}

impl Default for StdProcessAdapter {
    fn default() -> Self {
        Self::new(ProcessAdapterConfig::default())
    }
}

#[async_trait]
impl ProcessAdapter for StdProcessAdapter {
    async fn spawn(&self, name: &str, argv: &[String]) -> Result<ProcessHandle, AdapterError> {
        let mut command = Command::new(name);
        command.args(argv);
        command.stdin(Stdio::null());

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            // Its own process group, so a service manager stopping this
            // process's group does not take the worker down with it.
            command.process_group(0);
        }

        let child = command
            .spawn()
            .map_err(|source| AdapterError::Spawn { name: name.to_string(), source })?;

        let pid = child.id().ok_or_else(|| AdapterError::Spawn {
            name: name.to_string(),
            source: std::io::Error::other("child exited before its pid could be observed"),
        })?;

        let mut system = System::new();
        let start_time = process_start_time(&mut system, pid).unwrap_or(0);

        Ok(ProcessHandle { child, proc_info: ProcInfo::new(pid, start_time) })
    }

    async fn wait(&self, handle: &mut ProcessHandle) -> Result<(), AdapterError> {
        match handle.child.wait().await {
            Ok(_status) => Ok(()),
            Err(e) if e.raw_os_error() == Some(10) => Ok(()), // ECHILD: already reaped.
            Err(e) => Err(AdapterError::Wait(handle.proc_info.pid, e)),
        }
    }

    fn find_by_pid_and_start_time(&self, pid: u32, start_time: u64) -> bool {
        let mut system = System::new();
        match process_start_time(&mut system, pid) {
            Some(actual) => actual.abs_diff(start_time) <= self.config.start_time_tolerance_secs,
            None => false,
        }
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
