// SPDX-FileCopyrightText: 2026 Rakan Tani Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation state and the chat reply feed.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rakan_core::envelope::{AssistantMessage, ClientMessage};
use rakan_core::topic::CHAT_REPLY;
use rakan_core::{MessageLog, Notice, TopicCursor};
use tracing::{debug, info};

use crate::feed::parse;
use crate::history::HistoryReplay;
use crate::wamid::generate_wamid;

/// `message_type` of every plain-text chat message.
pub const TEXT_MESSAGE_TYPE: &str = "text";

pub const CHAT_UPDATED: &str = "Chat updated!";

/// Builds the envelope published on `whatsapp-gw` when the user sends text.
pub fn compose_client_message(
    text: &str,
    phone: &str,
    phone_number_id: &str,
    now: DateTime<Utc>,
) -> ClientMessage {
    ClientMessage {
        message_type: TEXT_MESSAGE_TYPE.to_string(),
        phone_number_id: phone_number_id.to_string(),
        context_id: generate_wamid(),
        client_phone: phone.to_string(),
        timestamp: now.timestamp().to_string(),
        client_name: String::new(),
        m: text.to_string(),
    }
}

/// Decodes a seconds-since-epoch timestamp string.
pub fn sent_at(timestamp: &str) -> Option<DateTime<Utc>> {
    timestamp
        .trim()
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
}

/// One row of the transcript: the i-th client message next to the i-th reply.
#[derive(Debug, Clone, Copy)]
pub struct Turn<'a> {
    pub index: usize,
    pub query: Option<&'a ClientMessage>,
    pub reply: Option<&'a AssistantMessage>,
}

/// Messages exchanged in this session.
///
/// Assistant messages are unique by `context_id`.
#[derive(Debug, Default)]
pub struct Conversation {
    client: Vec<ClientMessage>,
    assistant: Vec<AssistantMessage>,
    seen: HashSet<String>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn client_messages(&self) -> &[ClientMessage] {
        &self.client
    }

    pub fn assistant_messages(&self) -> &[AssistantMessage] {
        &self.assistant
    }

    pub fn push_client(&mut self, message: ClientMessage) {
        self.client.push(message);
    }

    /// Appends a reply unless its `context_id` was already accepted.
    pub fn push_assistant(&mut self, message: AssistantMessage) -> bool {
        if !self.seen.insert(message.context_id.clone()) {
            return false;
        }
        self.assistant.push(message);
        true
    }

    /// Appends replayed history and records its ids as processed.
    pub fn load_history(&mut self, replay: HistoryReplay) {
        self.client.extend(replay.client);
        for message in replay.assistant {
            self.push_assistant(message);
        }
    }

    /// The query paired with reply `index`, if any.
    pub fn query_for(&self, index: usize) -> Option<&ClientMessage> {
        self.client.get(index)
    }

    /// Client and assistant messages interleaved by index.
    pub fn transcript(&self) -> Vec<Turn<'_>> {
        let rows = self.client.len().max(self.assistant.len());
        (0..rows)
            .map(|index| Turn {
                index,
                query: self.client.get(index),
                reply: self.assistant.get(index),
            })
            .collect()
    }
}

/// Accepts replies on the shared `whatsapp-gw-reply` topic addressed to
/// this session's phone number.
#[derive(Debug)]
pub struct ChatReplyFeed {
    cursor: TopicCursor,
    phone: String,
}

impl ChatReplyFeed {
    pub fn new(phone: impl Into<String>) -> Self {
        Self {
            cursor: TopicCursor::new(CHAT_REPLY),
            phone: phone.into(),
        }
    }

    /// Folds new replies into `conversation`.
    ///
    /// Without a phone number nothing can be matched, and entries are left
    /// unconsumed.
    pub fn evaluate(&mut self, log: &MessageLog, conversation: &mut Conversation) -> Option<Notice> {
        if self.phone.is_empty() {
            return None;
        }

        let mut accepted = 0usize;
        for msg in self.cursor.take_new(log) {
            let Some(reply) = parse::<AssistantMessage>(&msg) else {
                continue;
            };
            if reply.client_phone.is_empty() || reply.client_phone != self.phone {
                continue;
            }
            let context_id = reply.context_id.clone();
            if conversation.push_assistant(reply) {
                accepted += 1;
            } else {
                debug!(context_id = %context_id, "duplicate reply ignored");
            }
        }

        if accepted == 0 {
            return None;
        }
        info!(accepted, "assistant replies received");
        Some(Notice::success(CHAT_UPDATED))
    }
}
