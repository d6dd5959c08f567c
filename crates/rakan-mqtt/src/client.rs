// SPDX-FileCopyrightText: 2026 Rakan Tani Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The MQTT transport client.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use rakan_core::traits::transport::ensure_publishable;
use rakan_core::{
    ConnectionState, LogReader, LogWriter, RakanError, SubscribeAck, Transport, TransportMessage,
    message_log,
};
use rumqttc::{
    AsyncClient, ConnectReturnCode, Event, EventLoop, Incoming, Outgoing, QoS,
    SubscribeReasonCode,
};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::options::{ClientRole, ClientSettings};
use crate::subscriptions::Subscriptions;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// State shared between the client handle and its event-loop driver.
struct Shared {
    name: String,
    role: ClientRole,
    client: AsyncClient,
    state: watch::Sender<ConnectionState>,
    log: LogWriter,
    subscriptions: Mutex<Subscriptions>,
    closing: AtomicBool,
    reconnect_delay: Duration,
    /// The event loop while no driver task owns it.
    parked: Mutex<Option<EventLoop>>,
}

impl Shared {
    fn set_state(&self, next: ConnectionState) {
        self.state.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            debug!(client = %self.name, from = %current, to = %next, "connection state");
            *current = next;
            true
        });
    }

    fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    fn is_closing(&self) -> bool {
        self.closing.load(Ordering::Acquire)
    }

    fn handle_event(&self, event: Event) {
        match event {
            Event::Incoming(Incoming::ConnAck(ack)) => {
                if ack.code != ConnectReturnCode::Success {
                    // rumqttc reports refusals as poll errors; nothing to do here.
                    return;
                }
                info!(client = %self.name, "connected");
                self.set_state(ConnectionState::Connected);
                if self.role.resubscribes() {
                    self.resubscribe();
                }
            }
            Event::Incoming(Incoming::Publish(publish)) => {
                let message = String::from_utf8_lossy(&publish.payload).into_owned();
                debug!(client = %self.name, topic = %publish.topic, bytes = message.len(), "message received");
                self.log.append(TransportMessage::new(publish.topic, message));
            }
            Event::Incoming(Incoming::SubAck(ack)) => {
                let granted = ack
                    .return_codes
                    .iter()
                    .all(|code| matches!(code, SubscribeReasonCode::Success(_)));
                if !granted {
                    warn!(client = %self.name, pkid = ack.pkid, "subscription rejected by broker");
                }
                lock(&self.subscriptions).acknowledged(ack.pkid, granted);
            }
            Event::Outgoing(Outgoing::Subscribe(pkid)) => {
                lock(&self.subscriptions).sent(pkid);
            }
            _ => {}
        }
    }

    /// Replays every requested topic. Failures are silent beyond a log line.
    fn resubscribe(&self) {
        let mut subs = lock(&self.subscriptions);
        for topic in subs.topics() {
            match self.client.try_subscribe(topic.as_str(), QoS::AtMostOnce) {
                Ok(()) => subs.queue(None),
                Err(e) => warn!(client = %self.name, topic = %topic, error = %e, "resubscribe failed"),
            }
        }
    }
}

/// What the driver does after the event loop reports an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AfterError {
    /// Stop driving and settle in this state.
    Stop(ConnectionState),
    /// Wait this long, then attempt again.
    Retry(Duration),
}

/// An attempt that never completes the handshake ends in `Failed`. Losing
/// an established connection ends in `Disconnected`, and roles that retry
/// schedule another attempt after `delay`.
fn after_error(
    role: ClientRole,
    before: ConnectionState,
    closing: bool,
    delay: Duration,
) -> AfterError {
    if closing {
        return AfterError::Stop(ConnectionState::Disconnected);
    }
    if before != ConnectionState::Connected {
        return AfterError::Stop(ConnectionState::Failed);
    }
    if role.retries_on_loss() {
        AfterError::Retry(delay)
    } else {
        AfterError::Stop(ConnectionState::Disconnected)
    }
}

/// Polls the event loop until the connection ends for good.
///
/// The event loop is parked again before the final state is published, so
/// a caller reacting to that state can start a new attempt at once.
async fn drive(shared: Arc<Shared>, mut eventloop: EventLoop) {
    let settled = loop {
        let e = match eventloop.poll().await {
            Ok(event) => {
                shared.handle_event(event);
                continue;
            }
            Err(e) => e,
        };
        lock(&shared.subscriptions).fail_in_flight();

        let before = shared.state();
        let closing = shared.is_closing();
        match after_error(shared.role, before, closing, shared.reconnect_delay) {
            AfterError::Stop(state) => {
                if state == ConnectionState::Failed {
                    warn!(client = %shared.name, error = %e, "connection attempt failed");
                } else if !closing {
                    warn!(client = %shared.name, error = %e, "connection lost");
                }
                break state;
            }
            AfterError::Retry(delay) => {
                warn!(client = %shared.name, error = %e, "connection lost");
                shared.set_state(ConnectionState::Disconnected);
                tokio::time::sleep(delay).await;
                if shared.is_closing() {
                    break ConnectionState::Disconnected;
                }
                info!(client = %shared.name, "reconnecting");
                shared.set_state(ConnectionState::Connecting);
            }
        }
    };
    *lock(&shared.parked) = Some(eventloop);
    shared.set_state(settled);
}

/// Publish/subscribe client over MQTT-on-WebSocket.
///
/// Construction builds the rumqttc client ("client ready"); [`Transport::connect`]
/// spawns the task that drives the network. Every received PUBLISH is
/// appended to the message log in arrival order.
pub struct MqttTransport {
    shared: Arc<Shared>,
    reader: LogReader,
    driver: Mutex<Option<JoinHandle<()>>>,
}

impl MqttTransport {
    /// Builds a client from role settings without touching the network.
    pub fn new(settings: ClientSettings) -> Result<Self, RakanError> {
        let options = settings.to_mqtt_options()?;
        let (client, eventloop) = AsyncClient::new(options, settings.request_capacity);
        let (writer, reader) = message_log();
        let (state, _) = watch::channel(ConnectionState::Disconnected);

        Ok(Self {
            shared: Arc::new(Shared {
                name: format!("{}:{}", settings.role, settings.client_id),
                role: settings.role,
                client,
                state,
                log: writer,
                subscriptions: Mutex::new(Subscriptions::default()),
                closing: AtomicBool::new(false),
                reconnect_delay: settings.reconnect_delay,
                parked: Mutex::new(Some(eventloop)),
            }),
            reader,
            driver: Mutex::new(None),
        })
    }

    pub fn role(&self) -> ClientRole {
        self.shared.role
    }

    /// Topics that will be replayed on the next (re)connect.
    pub fn subscribed_topics(&self) -> Vec<String> {
        lock(&self.shared.subscriptions).topics()
    }
}

impl Drop for MqttTransport {
    fn drop(&mut self) {
        if let Some(handle) = lock(&self.driver).take() {
            handle.abort();
        }
    }
}

#[async_trait]
impl Transport for MqttTransport {
    fn name(&self) -> &str {
        &self.shared.name
    }

    fn is_client_ready(&self) -> bool {
        !self.shared.is_closing()
    }

    fn connection(&self) -> watch::Receiver<ConnectionState> {
        self.shared.state.subscribe()
    }

    fn log(&self) -> LogReader {
        self.reader.clone()
    }

    fn connect(&self) {
        if !self.is_client_ready() {
            error!(client = %self.shared.name, "client is closed, cannot connect");
            return;
        }
        let state = self.shared.state();
        if !state.can_connect() {
            warn!(client = %self.shared.name, %state, "already connected or connecting");
            return;
        }
        let Some(eventloop) = lock(&self.shared.parked).take() else {
            debug!(client = %self.shared.name, "connection attempt already in flight");
            return;
        };

        info!(client = %self.shared.name, "connecting");
        self.shared.set_state(ConnectionState::Connecting);
        let handle = tokio::spawn(drive(self.shared.clone(), eventloop));
        *lock(&self.driver) = Some(handle);
    }

    async fn disconnect(&self) {
        if self.shared.closing.swap(true, Ordering::AcqRel) {
            return;
        }
        if self.shared.state() == ConnectionState::Connected
            && let Err(e) = self.shared.client.disconnect().await
        {
            debug!(client = %self.shared.name, error = %e, "disconnect request not delivered");
        }
        let handle = lock(&self.driver).take();
        if let Some(handle) = handle {
            handle.abort();
        }
        lock(&self.shared.subscriptions).fail_all();
        self.shared.set_state(ConnectionState::Disconnected);
        info!(client = %self.shared.name, "disconnected");
    }

    async fn publish(&self, topic: &str, message: &str) -> Result<(), RakanError> {
        ensure_publishable(topic, message)?;
        if !self.is_client_ready() {
            return Err(RakanError::ClientNotReady);
        }
        let state = self.shared.state();
        if state != ConnectionState::Connected {
            return Err(RakanError::Transport {
                message: format!("cannot publish to {topic} while {state}"),
                source: None,
            });
        }
        self.shared
            .client
            .try_publish(topic, QoS::AtMostOnce, false, message.as_bytes().to_vec())
            .map_err(|e| RakanError::transport(format!("publish to {topic} failed"), e))?;
        debug!(client = %self.shared.name, topic, "published");
        Ok(())
    }

    fn subscribe(&self, topic: &str) -> SubscribeAck {
        if topic.trim().is_empty() {
            warn!(client = %self.shared.name, "refusing to subscribe to an empty topic");
            return SubscribeAck::ready(false);
        }
        if !self.is_client_ready() {
            warn!(client = %self.shared.name, topic, "client is closed, subscription dropped");
            return SubscribeAck::ready(false);
        }

        let mut subs = lock(&self.shared.subscriptions);
        match self.shared.client.try_subscribe(topic, QoS::AtMostOnce) {
            Ok(()) => {
                subs.remember(topic);
                let (ack, tx) = SubscribeAck::pending();
                subs.queue(Some(tx));
                debug!(client = %self.shared.name, topic, "subscribe requested");
                ack
            }
            Err(e) => {
                subs.forget(topic);
                warn!(client = %self.shared.name, topic, error = %e, "subscribe failed");
                SubscribeAck::ready(false)
            }
        }
    }
}
