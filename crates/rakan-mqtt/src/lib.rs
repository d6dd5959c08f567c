// SPDX-FileCopyrightText: 2026 Rakan Tani Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! MQTT transport for the Rakan Tani client.
//!
//! Implements [`rakan_core::Transport`] over MQTT-on-WebSocket via rumqttc,
//! in two roles: the onboarding client (fixed credentials, no retry) and
//! the UAT client (session-token credentials, retry after abnormal loss,
//! subscription replay on every connect).

mod client;
pub mod options;
mod subscriptions;

pub use client::MqttTransport;
pub use options::{ClientRole, ClientSettings, MAX_PACKET_SIZE};
