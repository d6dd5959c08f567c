// SPDX-FileCopyrightText: 2026 Rakan Tani Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat history replay.
//!
//! The backend answers a history request on `history/{sessionId}` with
//! query/answer pairs. They are replayed once per session as synthetic
//! client and assistant messages, most recent last.

use chrono::{DateTime, NaiveDateTime};
use rakan_core::envelope::{AssistantMessage, ClientMessage, HistoryEntry, HistoryResponse};
use rakan_core::topic::{HISTORY, response_topic};
use rakan_core::{MessageLog, SessionId, TopicCursor};
use tracing::{debug, info};

use crate::chat::TEXT_MESSAGE_TYPE;
use crate::feed::parse;
use crate::wamid::generate_wamid;

/// Who the replayed messages are attributed to.
#[derive(Debug, Clone)]
pub struct ReplayIdentity {
    pub phone: String,
    pub farmer_id: i64,
    pub phone_number_id: String,
}

/// Replayed messages, index-aligned (query `i` pairs with answer `i`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryReplay {
    pub client: Vec<ClientMessage>,
    pub assistant: Vec<AssistantMessage>,
}

/// Reads `modified` as unix seconds or an RFC 3339 / ISO-like timestamp.
pub fn modified_seconds(modified: &str) -> Option<i64> {
    let modified = modified.trim();
    if let Ok(secs) = modified.parse::<i64>() {
        return Some(secs);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(modified) {
        return Some(dt.timestamp());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(modified, fmt).ok())
        .map(|naive| naive.and_utc().timestamp())
}

/// Sorts entries oldest first, keeps the `limit` most recent, and turns
/// each into a client/assistant pair with fresh context ids.
///
/// Entries with an unreadable `modified` sort first and carry an empty
/// timestamp.
pub fn messages_from_history(
    entries: &[HistoryEntry],
    limit: usize,
    identity: &ReplayIdentity,
) -> HistoryReplay {
    let mut dated: Vec<(Option<i64>, &HistoryEntry)> = entries
        .iter()
        .map(|entry| (modified_seconds(&entry.modified), entry))
        .collect();
    dated.sort_by_key(|(secs, _)| *secs);
    let skip = dated.len().saturating_sub(limit);

    let mut replay = HistoryReplay::default();
    for (secs, entry) in dated.into_iter().skip(skip) {
        let timestamp = secs.map(|s| s.to_string()).unwrap_or_default();
        replay.client.push(ClientMessage {
            message_type: TEXT_MESSAGE_TYPE.to_string(),
            phone_number_id: identity.phone_number_id.clone(),
            context_id: generate_wamid(),
            client_phone: identity.phone.clone(),
            timestamp: timestamp.clone(),
            client_name: String::new(),
            m: entry.query.clone(),
        });
        replay.assistant.push(AssistantMessage {
            client_phone: identity.phone.clone(),
            context_id: generate_wamid(),
            farmer_id: identity.farmer_id,
            m: entry.answer.clone(),
            message: entry.answer.clone(),
            message_type: TEXT_MESSAGE_TYPE.to_string(),
            phone_number_id: identity.phone_number_id.clone(),
            timestamp,
            ..AssistantMessage::default()
        });
    }
    replay
}

/// Watches `history/{sessionId}` and yields its entries exactly once.
#[derive(Debug)]
pub struct HistoryFeed {
    cursor: TopicCursor,
    loaded: bool,
}

impl HistoryFeed {
    pub fn new(session: &SessionId) -> Self {
        Self {
            cursor: TopicCursor::new(response_topic(HISTORY, session.as_str())),
            loaded: false,
        }
    }

    pub fn topic(&self) -> &str {
        self.cursor.topic()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Returns the newest history payload the first time one parses.
    pub fn evaluate(&mut self, log: &MessageLog) -> Option<Vec<HistoryEntry>> {
        if self.loaded {
            return None;
        }
        let msg = self.cursor.take_latest(log)?;
        let response: HistoryResponse = parse(&msg)?;
        self.loaded = true;
        info!(entries = response.history.len(), "chat history received");
        if response.history.is_empty() {
            debug!("chat history is empty");
        }
        Some(response.history)
    }
}
