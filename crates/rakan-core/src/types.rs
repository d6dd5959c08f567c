// SPDX-FileCopyrightText: 2026 Rakan Tani Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the transport, router, and CLI.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tokio::sync::oneshot;

/// Per-session numeric identifier (12 digits, never leading zero).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A raw message received from the broker, tagged with its destination topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportMessage {
    pub topic: String,
    pub message: String,
}

impl TransportMessage {
    pub fn new(topic: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            message: message.into(),
        }
    }
}

/// Network state of a transport client.
///
/// Independent of "client constructed" readiness, which is reported
/// separately by [`crate::Transport::is_client_ready`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
pub enum ConnectionState {
    /// No connection and no attempt in flight.
    Disconnected,
    /// A connection attempt is outstanding.
    Connecting,
    /// Handshake complete.
    Connected,
    /// The last attempt was refused or never reached the broker.
    Failed,
}

impl ConnectionState {
    /// True when a new connection attempt may start.
    pub fn can_connect(self) -> bool {
        matches!(self, ConnectionState::Disconnected | ConnectionState::Failed)
    }
}

/// User-facing notification produced by a feed or a user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Notice::Success(text.into())
    }

    pub fn error(text: impl Into<String>) -> Self {
        Notice::Error(text.into())
    }

    pub fn text(&self) -> &str {
        match self {
            Notice::Success(t) | Notice::Error(t) => t,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }
}

/// Confirmation handle returned by [`crate::Transport::subscribe`].
///
/// Resolves to `true` once the broker acknowledges the subscription and
/// `false` when it is rejected or the connection goes away first.
#[derive(Debug)]
pub struct SubscribeAck {
    rx: Option<oneshot::Receiver<bool>>,
    immediate: bool,
}

impl SubscribeAck {
    /// An acknowledgement whose outcome is already known.
    pub fn ready(granted: bool) -> Self {
        Self {
            rx: None,
            immediate: granted,
        }
    }

    /// A pending acknowledgement plus the sender that resolves it.
    pub fn pending() -> (Self, oneshot::Sender<bool>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                rx: Some(rx),
                immediate: false,
            },
            tx,
        )
    }

    /// Wait for the broker's answer, giving up after `timeout`.
    pub async fn confirmed(self, timeout: Duration) -> bool {
        match self.rx {
            None => self.immediate,
            Some(rx) => matches!(tokio::time::timeout(timeout, rx).await, Ok(Ok(true))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn connection_state_round_trips_through_strings() {
        for state in [
            ConnectionState::Disconnected,
            ConnectionState::Connecting,
            ConnectionState::Connected,
            ConnectionState::Failed,
        ] {
            let parsed = ConnectionState::from_str(&state.to_string()).unwrap();
            assert_eq!(parsed, state);
        }
        assert_eq!(ConnectionState::Connected.to_string(), "connected");
    }

    #[test]
    fn only_idle_states_allow_connect() {
        assert!(ConnectionState::Disconnected.can_connect());
        assert!(ConnectionState::Failed.can_connect());
        assert!(!ConnectionState::Connecting.can_connect());
        assert!(!ConnectionState::Connected.can_connect());
    }

    #[tokio::test]
    async fn ready_ack_reports_immediately() {
        assert!(SubscribeAck::ready(true).confirmed(Duration::from_millis(1)).await);
        assert!(!SubscribeAck::ready(false).confirmed(Duration::from_millis(1)).await);
    }

    #[tokio::test]
    async fn pending_ack_resolves_from_sender() {
        let (ack, tx) = SubscribeAck::pending();
        tx.send(true).unwrap();
        assert!(ack.confirmed(Duration::from_secs(1)).await);
    }

    #[tokio::test]
    async fn dropped_sender_counts_as_rejection() {
        let (ack, tx) = SubscribeAck::pending();
        drop(tx);
        assert!(!ack.confirmed(Duration::from_secs(1)).await);
    }

    #[test]
    fn notice_accessors() {
        let n = Notice::error("boom");
        assert!(n.is_error());
        assert_eq!(n.text(), "boom");
        assert!(!Notice::success("ok").is_error());
    }
}
