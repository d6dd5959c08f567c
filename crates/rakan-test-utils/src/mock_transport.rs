// SPDX-FileCopyrightText: 2026 Rakan Tani Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock transport for deterministic testing.
//!
//! `MockTransport` implements `Transport` with injectable inbound messages
//! and captured publishes and subscriptions for assertion in tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::{oneshot, watch};

use rakan_core::topic::topic_matches;
use rakan_core::traits::transport::ensure_publishable;
use rakan_core::{
    ConnectionState, LogReader, LogWriter, RakanError, SubscribeAck, Transport, TransportMessage,
    message_log,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// How the mock answers subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckBehavior {
    /// Confirm immediately.
    Grant,
    /// Reject immediately.
    Reject,
    /// Hold until [`MockTransport::release_acks`] is called.
    Hold,
}

/// A mock publish/subscribe transport for testing.
///
/// - **inbound**: messages injected via `inject()` land in the log when a
///   non-rejected subscription filter matches their topic
/// - **published**: messages passed to `publish()` are captured
/// - **subscriptions**: every requested topic, in call order
pub struct MockTransport {
    writer: LogWriter,
    reader: LogReader,
    state: watch::Sender<ConnectionState>,
    published: Mutex<Vec<TransportMessage>>,
    subscriptions: Mutex<Vec<String>>,
    filters: Mutex<Vec<String>>,
    held_acks: Mutex<Vec<oneshot::Sender<bool>>>,
    ack_behavior: Mutex<AckBehavior>,
    fail_publish: AtomicBool,
    closed: AtomicBool,
    connect_calls: AtomicUsize,
}

impl MockTransport {
    /// Create a disconnected mock with an empty log.
    pub fn new() -> Self {
        let (writer, reader) = message_log();
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            writer,
            reader,
            state,
            published: Mutex::new(Vec::new()),
            subscriptions: Mutex::new(Vec::new()),
            filters: Mutex::new(Vec::new()),
            held_acks: Mutex::new(Vec::new()),
            ack_behavior: Mutex::new(AckBehavior::Grant),
            fail_publish: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            connect_calls: AtomicUsize::new(0),
        }
    }

    /// Create a mock that is already connected.
    pub fn connected() -> Self {
        let mock = Self::new();
        mock.set_state(ConnectionState::Connected);
        mock
    }

    /// Deliver an inbound message as if it arrived from the broker.
    ///
    /// Like a broker, the mock drops messages on topics nobody subscribed
    /// to. Returns whether the message was delivered.
    pub fn inject(&self, topic: &str, message: impl Into<String>) -> bool {
        let delivered = lock(&self.filters).iter().any(|f| topic_matches(f, topic));
        if delivered {
            self.writer.append(TransportMessage::new(topic, message));
        }
        delivered
    }

    pub fn set_state(&self, state: ConnectionState) {
        self.state.send_replace(state);
    }

    /// Make every subsequent publish fail with a transport error.
    pub fn fail_publishes(&self, fail: bool) {
        self.fail_publish.store(fail, Ordering::Release);
    }

    pub fn set_ack_behavior(&self, behavior: AckBehavior) {
        *lock(&self.ack_behavior) = behavior;
    }

    /// Resolve every held subscription with `granted`.
    pub fn release_acks(&self, granted: bool) {
        for tx in lock(&self.held_acks).drain(..) {
            let _ = tx.send(granted);
        }
    }

    /// All messages passed to `publish()`, in order.
    pub fn published(&self) -> Vec<TransportMessage> {
        lock(&self.published).clone()
    }

    /// Payloads published on exactly `topic`.
    pub fn published_on(&self, topic: &str) -> Vec<String> {
        lock(&self.published)
            .iter()
            .filter(|m| m.topic == topic)
            .map(|m| m.message.clone())
            .collect()
    }

    /// Last payload on `topic`, parsed as JSON.
    pub fn last_published_json(&self, topic: &str) -> Option<serde_json::Value> {
        self.published_on(topic)
            .last()
            .and_then(|p| serde_json::from_str(p).ok())
    }

    pub fn clear_published(&self) {
        lock(&self.published).clear();
    }

    /// Every topic passed to `subscribe()`, in call order.
    pub fn subscriptions(&self) -> Vec<String> {
        lock(&self.subscriptions).clone()
    }

    pub fn connect_calls(&self) -> usize {
        self.connect_calls.load(Ordering::Acquire)
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn name(&self) -> &str {
        "mock-transport"
    }

    fn is_client_ready(&self) -> bool {
        !self.closed.load(Ordering::Acquire)
    }

    fn connection(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    fn log(&self) -> LogReader {
        self.reader.clone()
    }

    fn connect(&self) {
        self.connect_calls.fetch_add(1, Ordering::AcqRel);
        if self.state.borrow().can_connect() {
            self.set_state(ConnectionState::Connected);
        }
    }

    async fn disconnect(&self) {
        self.closed.store(true, Ordering::Release);
        self.set_state(ConnectionState::Disconnected);
    }

    async fn publish(&self, topic: &str, message: &str) -> Result<(), RakanError> {
        ensure_publishable(topic, message)?;
        if !self.is_client_ready() {
            return Err(RakanError::ClientNotReady);
        }
        let state = *self.state.borrow();
        if state != ConnectionState::Connected {
            return Err(RakanError::Transport {
                message: format!("cannot publish to {topic} while {state}"),
                source: None,
            });
        }
        if self.fail_publish.load(Ordering::Acquire) {
            return Err(RakanError::Transport {
                message: format!("mock publish to {topic} failed"),
                source: None,
            });
        }
        lock(&self.published).push(TransportMessage::new(topic, message));
        Ok(())
    }

    fn subscribe(&self, topic: &str) -> SubscribeAck {
        lock(&self.subscriptions).push(topic.to_string());
        let behavior = *lock(&self.ack_behavior);
        if behavior != AckBehavior::Reject {
            lock(&self.filters).push(topic.to_string());
        }
        match behavior {
            AckBehavior::Grant => SubscribeAck::ready(true),
            AckBehavior::Reject => SubscribeAck::ready(false),
            AckBehavior::Hold => {
                let (ack, tx) = SubscribeAck::pending();
                lock(&self.held_acks).push(tx);
                ack
            }
        }
    }
}
