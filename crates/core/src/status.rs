// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The status lattice shared by plugin results and document state.

use serde::{Deserialize, Serialize};

/// Terminal and non-terminal statuses for a plugin or a document.
///
/// `InProgress` is the only non-terminal value; every other variant marks
/// the end of a run. Document-level status is monotonic: once a document
/// reaches a terminal value it never returns to `InProgress`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Status {
    /// Queued, not yet started.
    Pending,
    /// Still running; for documents, also used for every intermediate update.
    InProgress,
    Success,
    SuccessAndReboot,
    Failed,
    Cancelled,
    TimedOut,
    /// Step was skipped (precondition not met); counts as a success for folding.
    Skipped,
}

impl Status {
    /// Whether this status marks the end of execution.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Status::Pending | Status::InProgress)
    }

    /// Whether this status counts as "succeeded" for the purposes of the
    /// all-plugins-succeeded fold rule (§4.8 rule 5).
    pub fn counts_as_success(&self) -> bool {
        matches!(self, Status::Success | Status::Skipped)
    }
}

crate::simple_display! {
    Status {
        Pending => "Pending",
        InProgress => "InProgress",
        Success => "Success",
        SuccessAndReboot => "SuccessAndReboot",
        Failed => "Failed",
        Cancelled => "Cancelled",
        TimedOut => "TimedOut",
        Skipped => "Skipped",
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
