// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use doc_adapters::fakes::FakePluginRunner;
use doc_core::test_support::{sample_plugin, DocumentStateBuilder};

use crate::backend_executer::CancelContent;

use super::*;

fn sample_state() -> DocumentState {
    DocumentStateBuilder::default().plugins(vec![sample_plugin("p1", None), sample_plugin("p2", None)]).build()
}

async fn recv_kind(rx: &mut mpsc::Receiver<Datagram>) -> MessageKind {
    tokio::time::timeout(Duration::from_secs(2), rx.recv()).await.unwrap().unwrap().kind().unwrap()
}

#[tokio::test]
async fn pluginconfig_starts_the_runner_and_streams_replies_then_complete() {
    let runner = Arc::new(FakePluginRunner::new(Status::Success));
    let (accept_tx, mut accept_rx) = mpsc::channel(16);
    let (stop_tx, mut stop_rx) = mpsc::channel(4);
    let mut backend = WorkerBackend::new(runner, accept_tx, stop_tx);

    let document = sample_state();
    let datagram = Datagram::create(MessageKind::Pluginconfig, &document).unwrap();
    backend.process(datagram).await.unwrap();

    assert_eq!(recv_kind(&mut accept_rx).await, MessageKind::Reply);
    assert_eq!(recv_kind(&mut accept_rx).await, MessageKind::Reply);
    assert_eq!(recv_kind(&mut accept_rx).await, MessageKind::Complete);

    let signal = tokio::time::timeout(Duration::from_secs(2), stop_rx.recv()).await.unwrap().unwrap();
    assert_eq!(signal, StopSignal::Shutdown);
}

#[tokio::test]
async fn pluginconfig_is_idempotent_and_starts_the_runner_once() {
    let runner = Arc::new(FakePluginRunner::new(Status::Success));
    let (accept_tx, mut accept_rx) = mpsc::channel(16);
    let (stop_tx, _stop_rx) = mpsc::channel(4);
    let mut backend = WorkerBackend::new(runner, accept_tx, stop_tx);

    let document = sample_state();
    let first = Datagram::create(MessageKind::Pluginconfig, &document).unwrap();
    let second = Datagram::create(MessageKind::Pluginconfig, &document).unwrap();
    backend.process(first).await.unwrap();
    backend.process(second).await.unwrap();

    // Exactly one pluginconfig-triggered run: two replies then one complete,
    // never doubled.
    assert_eq!(recv_kind(&mut accept_rx).await, MessageKind::Reply);
    assert_eq!(recv_kind(&mut accept_rx).await, MessageKind::Reply);
    assert_eq!(recv_kind(&mut accept_rx).await, MessageKind::Complete);
    assert!(tokio::time::timeout(Duration::from_millis(100), accept_rx.recv()).await.is_err());
}

#[tokio::test]
async fn cancel_is_observed_by_the_runner() {
    let runner = Arc::new(FakePluginRunner::new(Status::Success));
    let (accept_tx, mut accept_rx) = mpsc::channel(16);
    let (stop_tx, _stop_rx) = mpsc::channel(4);
    let mut backend = WorkerBackend::new(runner, accept_tx, stop_tx);

    let cancel_datagram = Datagram::create(MessageKind::Cancel, &CancelContent::default()).unwrap();
    backend.process(cancel_datagram).await.unwrap();

    let document = sample_state();
    let datagram = Datagram::create(MessageKind::Pluginconfig, &document).unwrap();
    backend.process(datagram).await.unwrap();

    // Every step reports Cancelled once the flag was set before the runner started.
    let mut saw_cancelled = false;
    loop {
        let datagram = tokio::time::timeout(Duration::from_secs(2), accept_rx.recv()).await.unwrap().unwrap();
        let kind = datagram.kind().unwrap();
        let content: ReplyContent = datagram.content_as().unwrap();
        if content.plugin_results.values().any(|r| r.status == Status::Cancelled) {
            saw_cancelled = true;
        }
        if kind == MessageKind::Complete {
            break;
        }
    }
    assert!(saw_cancelled);
}

#[tokio::test]
async fn reply_is_unsupported_at_the_worker() {
    let runner = Arc::new(FakePluginRunner::new(Status::Success));
    let (accept_tx, _accept_rx) = mpsc::channel(16);
    let (stop_tx, _stop_rx) = mpsc::channel(4);
    let mut backend = WorkerBackend::new(runner, accept_tx, stop_tx);

    let content = ReplyContent { status: Status::Success, plugin_results: IndexMap::new(), last_plugin: None };
    let datagram = Datagram::create(MessageKind::Reply, &content).unwrap();
    assert!(backend.process(datagram).await.is_err());
}
