// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Shared setup for the `docd` master daemon and the `doc-worker` binary:
//! configuration loading and logging initialization (§6's ambient
//! additions).

pub mod config;
pub mod logging;

pub use config::AgentConfig;
pub use logging::init_tracing;
