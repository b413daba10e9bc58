// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Pluggable external interfaces: the collaborators named in §6 that this
//! core consumes but does not implement a production backend for (the
//! poller, the cloud uploader, the parameter store, the plugin runner),
//! plus the one interface this core does own a production implementation
//! of: the process adapter.

pub mod error;
pub mod plugin_runner;
pub mod poller;
pub mod process;
pub mod parameter_store;
pub mod uploader;

#[cfg(any(test, feature = "test-support"))]
pub mod fakes;

pub use error::AdapterError;
pub use parameter_store::{EnvParameterStore, ParameterStore};
pub use plugin_runner::PluginRunner;
pub use poller::Poller;
pub use process::{ProcessAdapter, ProcessAdapterConfig, ProcessHandle, StdProcessAdapter};
pub use uploader::Uploader;
