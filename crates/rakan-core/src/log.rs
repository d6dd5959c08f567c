// SPDX-FileCopyrightText: 2026 Rakan Tani Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only, session-scoped log of every message the transport receives.
//!
//! The transport holds the only [`LogWriter`]. Consumers hold a
//! [`LogReader`] and keep their own [`TopicCursor`] per feed, so each
//! evaluation only touches entries that arrived since the last one.
//! Order within a topic equals arrival order; nothing is ever removed.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use tokio::sync::watch;

use crate::types::TransportMessage;

/// The log itself: all entries in arrival order plus a per-topic index.
#[derive(Debug, Default)]
pub struct MessageLog {
    entries: Vec<TransportMessage>,
    by_topic: HashMap<String, Vec<usize>>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of entries across all topics.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in arrival order.
    pub fn entries(&self) -> &[TransportMessage] {
        &self.entries
    }

    /// Number of entries received on exactly `topic`.
    pub fn count(&self, topic: &str) -> usize {
        self.by_topic.get(topic).map_or(0, Vec::len)
    }

    /// Entries on `topic` starting at the per-topic position `offset`.
    pub fn since<'a>(
        &'a self,
        topic: &str,
        offset: usize,
    ) -> impl Iterator<Item = &'a TransportMessage> + 'a {
        self.by_topic
            .get(topic)
            .map(|idx| idx.get(offset..).unwrap_or(&[]))
            .unwrap_or(&[])
            .iter()
            .map(move |&i| &self.entries[i])
    }

    /// Most recent entry on `topic`.
    pub fn latest(&self, topic: &str) -> Option<&TransportMessage> {
        self.by_topic
            .get(topic)
            .and_then(|idx| idx.last())
            .map(|&i| &self.entries[i])
    }

    fn append(&mut self, message: TransportMessage) {
        let index = self.entries.len();
        self.by_topic
            .entry(message.topic.clone())
            .or_default()
            .push(index);
        self.entries.push(message);
    }
}

/// Creates a new empty log and returns its single writer plus a reader.
pub fn message_log() -> (LogWriter, LogReader) {
    let log = Arc::new(RwLock::new(MessageLog::new()));
    let (tx, rx) = watch::channel(0usize);
    (
        LogWriter {
            log: log.clone(),
            tx,
        },
        LogReader { log, rx },
    )
}

/// Exclusive write handle, owned by the transport.
#[derive(Debug)]
pub struct LogWriter {
    log: Arc<RwLock<MessageLog>>,
    tx: watch::Sender<usize>,
}

impl LogWriter {
    /// Appends a message and wakes every reader.
    pub fn append(&self, message: TransportMessage) {
        let len = {
            let mut log = self.log.write().unwrap_or_else(PoisonError::into_inner);
            log.append(message);
            log.len()
        };
        self.tx.send_replace(len);
    }

    /// Creates an additional reader for this log.
    pub fn reader(&self) -> LogReader {
        LogReader {
            log: self.log.clone(),
            rx: self.tx.subscribe(),
        }
    }
}

/// Read-only view of the log with change notification.
#[derive(Debug, Clone)]
pub struct LogReader {
    log: Arc<RwLock<MessageLog>>,
    rx: watch::Receiver<usize>,
}

impl LogReader {
    /// Borrow the log for a synchronous evaluation pass.
    pub fn read(&self) -> RwLockReadGuard<'_, MessageLog> {
        self.log.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Waits until the log grows past what this reader last observed.
    ///
    /// Returns `false` once the writer is gone.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }

    /// Current number of entries.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A consumer-held read position on one topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicCursor {
    topic: String,
    offset: usize,
}

impl TopicCursor {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            offset: 0,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Number of entries this cursor has already consumed.
    pub fn processed(&self) -> usize {
        self.offset
    }

    /// True when the topic has entries this cursor has not consumed.
    pub fn has_new(&self, log: &MessageLog) -> bool {
        log.count(&self.topic) > self.offset
    }

    /// Takes every unconsumed entry, oldest first, and advances past them.
    pub fn take_new(&mut self, log: &MessageLog) -> Vec<TransportMessage> {
        let fresh: Vec<TransportMessage> = log.since(&self.topic, self.offset).cloned().collect();
        self.offset += fresh.len();
        fresh
    }

    /// Takes only the most recent entry if anything new arrived, and marks
    /// everything up to it consumed.
    pub fn take_latest(&mut self, log: &MessageLog) -> Option<TransportMessage> {
        if !self.has_new(log) {
            return None;
        }
        self.offset = log.count(&self.topic);
        log.latest(&self.topic).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(topic: &str, body: &str) -> TransportMessage {
        TransportMessage::new(topic, body)
    }

    #[test]
    fn append_keeps_arrival_order_and_topic_index() {
        let (writer, reader) = message_log();
        writer.append(msg("a", "1"));
        writer.append(msg("b", "2"));
        writer.append(msg("a", "3"));

        let log = reader.read();
        assert_eq!(log.len(), 3);
        assert_eq!(log.count("a"), 2);
        assert_eq!(log.count("missing"), 0);
        let bodies: Vec<_> = log.since("a", 0).map(|m| m.message.as_str()).collect();
        assert_eq!(bodies, vec!["1", "3"]);
        assert_eq!(log.latest("b").unwrap().message, "2");
    }

    #[test]
    fn cursor_only_sees_new_entries() {
        let (writer, reader) = message_log();
        let mut cursor = TopicCursor::new("a");
        writer.append(msg("a", "1"));

        assert_eq!(cursor.take_new(&reader.read()).len(), 1);
        assert!(cursor.take_new(&reader.read()).is_empty());

        writer.append(msg("b", "x"));
        assert!(!cursor.has_new(&reader.read()));

        writer.append(msg("a", "2"));
        writer.append(msg("a", "3"));
        let fresh = cursor.take_new(&reader.read());
        assert_eq!(fresh.len(), 2);
        assert_eq!(fresh[1].message, "3");
        assert_eq!(cursor.processed(), 3);
    }

    #[test]
    fn take_latest_skips_intermediate_entries() {
        let (writer, reader) = message_log();
        let mut cursor = TopicCursor::new("s");
        writer.append(msg("s", "old"));
        writer.append(msg("s", "new"));

        assert_eq!(cursor.take_latest(&reader.read()).unwrap().message, "new");
        assert!(cursor.take_latest(&reader.read()).is_none());
    }

    #[test]
    fn since_past_end_is_empty() {
        let (writer, reader) = message_log();
        writer.append(msg("a", "1"));
        assert_eq!(reader.read().since("a", 5).count(), 0);
    }

    #[tokio::test]
    async fn readers_are_woken_on_append() {
        let (writer, mut reader) = message_log();
        let mut second = writer.reader();
        writer.append(msg("a", "1"));
        assert!(reader.changed().await);
        assert!(second.changed().await);
        assert_eq!(second.len(), 1);

        drop(writer);
        assert!(!reader.changed().await);
    }
}
