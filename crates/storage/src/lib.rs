// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Persistence of [`doc_core::DocumentState`] across master restarts.

pub mod document_store;
pub mod error;

pub use document_store::{DocumentStore, FileDocumentStore};
pub use error::StoreError;
