// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The cancel-flag: a small, monotonic state machine shared by the
//! Executer Backend, Worker Backend, and plugin runner.

use tokio::sync::watch;

/// States of the cancel-flag. Transitions are monotonic and one-way from
/// `Pending`; every observer sees the same transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelState {
    Pending,
    Canceled,
    ShutDown,
    Completed,
}

/// The writable half, held by whichever side drives cancellation (the
/// Executer Backend's supervisory task).
pub struct CancelFlag {
    tx: watch::Sender<CancelState>,
}

/// A read-only, cloneable observer handle. Multiple tasks (the plugin
/// runner, the messaging loop) can each hold one and see the same
/// transitions.
#[derive(Clone)]
pub struct CancelObserver {
    rx: watch::Receiver<CancelState>,
}

impl CancelFlag {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(CancelState::Pending);
        Self { tx }
    }

    pub fn observer(&self) -> CancelObserver {
        CancelObserver { rx: self.tx.subscribe() }
    }

    pub fn current(&self) -> CancelState {
        *self.tx.borrow()
    }

    /// Request cancellation. Dominates a prior or subsequent `shutdown()`
    /// request per the "Canceled dominates ShutDown" resolution.
    pub fn cancel(&self) {
        self.transition(CancelState::Canceled);
    }

    /// Request a graceful master shutdown. A no-op once `Canceled` has
    /// already been observed.
    pub fn shutdown(&self) {
        if self.current() != CancelState::Canceled {
            self.transition(CancelState::ShutDown);
        }
    }

    /// Mark the run as finished. Terminal: no further transition is
    /// accepted afterward.
    pub fn complete(&self) {
        self.transition(CancelState::Completed);
    }

    fn transition(&self, next: CancelState) {
        if self.current() == CancelState::Completed {
            return;
        }
        if self.current() == CancelState::Canceled && next == CancelState::ShutDown {
            return;
        }
        let _ = self.tx.send(next);
    }
}

impl Default for CancelFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelObserver {
    pub fn current(&self) -> CancelState {
        *self.rx.borrow()
    }

    /// Waits for the next transition and returns the new state. Resolves
    /// immediately with the current state if the sender has already been
    /// dropped.
    pub async fn changed(&mut self) -> CancelState {
        let _ = self.rx.changed().await;
        self.current()
    }
}

#[cfg(test)]
#[path = "cancel_tests.rs"]
mod tests;
