// SPDX-FileCopyrightText: 2026 Rakan Tani Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Helpers shared by every feed.

use rakan_core::TransportMessage;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Parses a log entry's payload. Malformed payloads count as "nothing new".
pub(crate) fn parse<T: DeserializeOwned>(msg: &TransportMessage) -> Option<T> {
    match serde_json::from_str(&msg.message) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(topic = %msg.topic, error = %e, "ignoring malformed payload");
            None
        }
    }
}
