// SPDX-FileCopyrightText: 2026 Rakan Tani Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Publish/subscribe transport trait shared by the onboarding and UAT clients.

use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::RakanError;
use crate::log::LogReader;
use crate::types::{ConnectionState, SubscribeAck};

/// A publish/subscribe connection feeding an append-only message log.
///
/// Every operation is fire-and-forget from the caller's side: outcomes are
/// observed later through [`Transport::connection`] or the message log.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Human-readable name of this client (used in logs).
    fn name(&self) -> &str;

    /// True once the client object exists, independent of network state.
    fn is_client_ready(&self) -> bool;

    /// Watch channel tracking the connection state.
    fn connection(&self) -> watch::Receiver<ConnectionState>;

    /// True when the handshake has completed.
    fn is_connected(&self) -> bool {
        *self.connection().borrow() == ConnectionState::Connected
    }

    /// Read handle on the shared message log.
    fn log(&self) -> LogReader;

    /// Starts a connection attempt.
    ///
    /// A no-op (logged) when already connected or when an attempt is in
    /// flight. Failures are logged and reflected in the connection state.
    fn connect(&self);

    /// Tears down the connection. Safe to call when not connected.
    async fn disconnect(&self);

    /// Sends `message` on `topic` with at-most-once delivery.
    ///
    /// Fails with [`RakanError::EmptyPayload`] before any I/O when either
    /// argument is blank after trimming.
    async fn publish(&self, topic: &str, message: &str) -> Result<(), RakanError>;

    /// Registers interest in a topic filter.
    ///
    /// Failures are logged; the returned ack resolves to `false`.
    fn subscribe(&self, topic: &str) -> SubscribeAck;
}

/// Rejects blank topics or payloads.
pub fn ensure_publishable(topic: &str, message: &str) -> Result<(), RakanError> {
    if topic.trim().is_empty() || message.trim().is_empty() {
        return Err(RakanError::EmptyPayload);
    }
    Ok(())
}
