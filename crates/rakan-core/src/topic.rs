// SPDX-FileCopyrightText: 2026 Rakan Tani Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Topic names and MQTT-style wildcard matching.
//!
//! Request topics are fixed; response topics are the request topic
//! followed by `/` and the request id (`history/{id}`, `uatschedule/{id}`).

/// Onboarding form submission (fire-and-forget).
pub const ONBOARD: &str = "onboard";
/// Chat history request.
pub const HISTORY: &str = "history";
/// Outbound chat message to the WhatsApp gateway.
pub const CHAT: &str = "whatsapp-gw";
/// Broadcast assistant replies, shared by every session.
pub const CHAT_REPLY: &str = "whatsapp-gw-reply";
/// Feedback on an assistant reply.
pub const FEEDBACK: &str = "uatfeedback";
/// Farmer schedule fetch.
pub const SCHEDULE: &str = "uatschedule";
/// Farmer current-day update.
pub const UPDATE_STEP: &str = "uatupdatestep";

/// Builds the response topic for `base` and `request_id`.
pub fn response_topic(base: &str, request_id: &str) -> String {
    format!("{base}/{request_id}")
}

/// Returns true when `topic` is matched by the subscription `filter`.
///
/// `+` matches exactly one level and `#` (last level only) matches the
/// remaining levels including none.
pub fn topic_matches(filter: &str, topic: &str) -> bool {
    let mut filter_levels = filter.split('/');
    let mut topic_levels = topic.split('/');

    loop {
        match (filter_levels.next(), topic_levels.next()) {
            (Some("#"), _) => return filter_levels.next().is_none(),
            (Some("+"), Some(_)) => {}
            (Some(f), Some(t)) if f == t => {}
            (None, None) => return true,
            _ => return false,
        }
    }
}
