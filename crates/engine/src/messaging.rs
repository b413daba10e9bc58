// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Messaging Loop (§4.3): the only mutator of an IPC channel endpoint,
//! pumping it in both directions against a backend.

use std::panic::AssertUnwindSafe;
use std::time::Duration;

use async_trait::async_trait;
use doc_wire::Datagram;
use futures_util::FutureExt;
use tokio::sync::mpsc;

use crate::channel::Channel;
use crate::error::ExecuteError;

/// Signal a backend publishes on its stop channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopSignal {
    /// Graceful: stop accepting new work, but don't tear the channel down
    /// until the inbound side has drained.
    Shutdown,
    /// Hard: destroy the IPC directory and return immediately.
    Terminate,
}

/// The half of a backend the messaging loop drives directly: processing an
/// inbound datagram. The outbound (`accept`) and `stop` signals are plain
/// channels rather than trait methods, so the loop can `select!` over them
/// without two simultaneous mutable borrows of the same trait object.
#[async_trait]
pub trait Backend: Send {
    async fn process(&mut self, datagram: Datagram) -> Result<(), ExecuteError>;
}

/// Drives `channel` against `backend` until the backend's stop channel
/// fires `Terminate`/closes, or a graceful `Shutdown` has fully drained, or
/// `stop_timer` elapses, or the IPC channel reaches EOF.
pub async fn run_messaging_loop<B: Backend>(
    mut channel: Channel,
    mut backend: B,
    mut stop_rx: mpsc::Receiver<StopSignal>,
    mut accept_rx: mpsc::Receiver<Datagram>,
    stop_timer: Duration,
) -> Result<(), ExecuteError> {
    let sleep = tokio::time::sleep(stop_timer);
    tokio::pin!(sleep);

    let mut graceful_stop_requested = false;
    let mut accept_closed = false;

    loop {
        tokio::select! {
            _ = &mut sleep => {
                tracing::warn!("messaging loop: stop-timer fired");
                channel.close();
                return Err(ExecuteError::Timeout);
            }

            stop = stop_rx.recv() => {
                match stop {
                    Some(StopSignal::Shutdown) => {
                        graceful_stop_requested = true;
                        if accept_closed {
                            channel.close();
                            return Ok(());
                        }
                    }
                    Some(StopSignal::Terminate) | None => {
                        channel.destroy().await?;
                        return Ok(());
                    }
                }
            }

            datagram = accept_rx.recv(), if !accept_closed => {
                match datagram {
                    Some(d) => {
                        let raw = d.to_wire()?;
                        channel.send(&raw).await?;
                    }
                    None => {
                        accept_closed = true;
                        if graceful_stop_requested {
                            channel.close();
                            return Ok(());
                        }
                    }
                }
            }

            inbound = channel.recv() => {
                match inbound {
                    Some(raw) => {
                        process_one(&mut backend, &raw).await;
                    }
                    None => return Ok(()),
                }
            }
        }
    }
}

/// Parses and dispatches one inbound payload, catching both protocol
/// errors and panics from the backend so a single bad message never takes
/// the loop down (§4.3's panic-safety requirement).
async fn process_one<B: Backend>(backend: &mut B, raw: &str) {
    let datagram = match Datagram::from_wire(raw) {
        Ok(d) => d,
        Err(e) => {
            tracing::warn!(error = %e, "messaging loop: malformed or unsupported datagram");
            return;
        }
    };

    let outcome = AssertUnwindSafe(backend.process(datagram)).catch_unwind().await;
    match outcome {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::warn!(error = %e, "messaging loop: backend rejected a datagram"),
        Err(_) => tracing::error!("messaging loop: backend panicked while processing a datagram"),
    }
}

#[cfg(test)]
#[path = "messaging_tests.rs"]
mod tests;
