// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;
use std::time::Duration;

use doc_wire::MessageKind;
use parking_lot::Mutex;

use crate::sequence::Role;

use super::*;

#[derive(Clone, Default)]
struct RecordingBackend {
    received: Arc<Mutex<Vec<MessageKind>>>,
}

#[async_trait]
impl Backend for RecordingBackend {
    async fn process(&mut self, datagram: Datagram) -> Result<(), ExecuteError> {
        self.received.lock().push(datagram.kind()?);
        Ok(())
    }
}

#[derive(Default)]
struct PanickingBackend;

#[async_trait]
impl Backend for PanickingBackend {
    async fn process(&mut self, _datagram: Datagram) -> Result<(), ExecuteError> {
        panic!("backend exploded");
    }
}

#[tokio::test]
async fn outbound_datagrams_are_forwarded_to_the_peer_in_order() {
    let root = tempfile::tempdir().unwrap();
    let master = crate::channel::Channel::open(root.path(), "doc-1", Role::Master).await.unwrap();
    let worker = crate::channel::Channel::open(root.path(), "doc-1", Role::Worker).await.unwrap();

    let (accept_tx, accept_rx) = mpsc::channel(8);
    let (_stop_tx, stop_rx) = mpsc::channel(1);

    let handle = tokio::spawn(run_messaging_loop(master, RecordingBackend::default(), stop_rx, accept_rx, Duration::from_secs(5)));

    let first = Datagram::create(MessageKind::Pluginconfig, &"first").unwrap();
    let second = Datagram::create(MessageKind::Cancel, &"second").unwrap();
    accept_tx.send(first).await.unwrap();
    accept_tx.send(second).await.unwrap();

    let raw_first = tokio::time::timeout(Duration::from_secs(2), worker.recv()).await.unwrap().unwrap();
    let raw_second = tokio::time::timeout(Duration::from_secs(2), worker.recv()).await.unwrap().unwrap();
    assert_eq!(Datagram::from_wire(&raw_first).unwrap().kind().unwrap(), MessageKind::Pluginconfig);
    assert_eq!(Datagram::from_wire(&raw_second).unwrap().kind().unwrap(), MessageKind::Cancel);

    drop(accept_tx);
    handle.abort();
}

#[tokio::test]
async fn inbound_datagrams_reach_the_backend() {
    let root = tempfile::tempdir().unwrap();
    let master = crate::channel::Channel::open(root.path(), "doc-1", Role::Master).await.unwrap();
    let worker = crate::channel::Channel::open(root.path(), "doc-1", Role::Worker).await.unwrap();

    let backend = RecordingBackend::default();
    let received = Arc::clone(&backend.received);

    let (_accept_tx, accept_rx) = mpsc::channel(8);
    let (_stop_tx, stop_rx) = mpsc::channel(1);
    let handle = tokio::spawn(run_messaging_loop(master, backend, stop_rx, accept_rx, Duration::from_secs(5)));

    let datagram = Datagram::create(MessageKind::Reply, &"hi").unwrap();
    worker.send(&datagram.to_wire().unwrap()).await.unwrap();

    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            if !received.lock().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    assert_eq!(received.lock().as_slice(), [MessageKind::Reply]);
    handle.abort();
}

#[tokio::test]
async fn terminate_destroys_the_channel_directory() {
    let root = tempfile::tempdir().unwrap();
    let dir = root.path().join("doc-1");
    let master = crate::channel::Channel::open(root.path(), "doc-1", Role::Master).await.unwrap();

    let (_accept_tx, accept_rx) = mpsc::channel(8);
    let (stop_tx, stop_rx) = mpsc::channel(1);

    let handle = tokio::spawn(run_messaging_loop(master, RecordingBackend::default(), stop_rx, accept_rx, Duration::from_secs(5)));
    stop_tx.send(StopSignal::Terminate).await.unwrap();

    handle.await.unwrap().unwrap();
    assert!(!dir.exists());
}

#[tokio::test]
async fn shutdown_waits_for_accept_to_drain_before_closing() {
    let root = tempfile::tempdir().unwrap();
    let dir = root.path().join("doc-1");
    let master = crate::channel::Channel::open(root.path(), "doc-1", Role::Master).await.unwrap();

    let (accept_tx, accept_rx) = mpsc::channel(8);
    let (stop_tx, stop_rx) = mpsc::channel(1);

    let handle = tokio::spawn(run_messaging_loop(master, RecordingBackend::default(), stop_rx, accept_rx, Duration::from_secs(5)));

    stop_tx.send(StopSignal::Shutdown).await.unwrap();
    // The loop must not close until accept_tx is dropped.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!handle.is_finished());

    drop(accept_tx);
    handle.await.unwrap().unwrap();
    assert!(dir.exists(), "graceful shutdown closes but never destroys the channel directory");
}

#[tokio::test]
async fn stop_timer_elapsing_returns_timeout_and_closes_the_channel() {
    let root = tempfile::tempdir().unwrap();
    let master = crate::channel::Channel::open(root.path(), "doc-1", Role::Master).await.unwrap();

    let (_accept_tx, accept_rx) = mpsc::channel(8);
    let (_stop_tx, stop_rx) = mpsc::channel(1);

    let result = run_messaging_loop(master, RecordingBackend::default(), stop_rx, accept_rx, Duration::from_millis(50)).await;
    assert!(matches!(result, Err(ExecuteError::Timeout)));
}

#[tokio::test]
async fn a_panicking_backend_never_takes_the_loop_down() {
    let root = tempfile::tempdir().unwrap();
    let master = crate::channel::Channel::open(root.path(), "doc-1", Role::Master).await.unwrap();
    let worker = crate::channel::Channel::open(root.path(), "doc-1", Role::Worker).await.unwrap();

    let (accept_tx, accept_rx) = mpsc::channel(8);
    let (stop_tx, stop_rx) = mpsc::channel(1);

    let handle = tokio::spawn(run_messaging_loop(master, PanickingBackend, stop_rx, accept_rx, Duration::from_secs(5)));

    let datagram = Datagram::create(MessageKind::Reply, &"hi").unwrap();
    worker.send(&datagram.to_wire().unwrap()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!handle.is_finished(), "the loop keeps running after a backend panic");

    drop(accept_tx);
    stop_tx.send(StopSignal::Terminate).await.unwrap();
    handle.await.unwrap().unwrap();
}
