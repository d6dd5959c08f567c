// SPDX-FileCopyrightText: 2026 Rakan Tani Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client-held subscription bookkeeping.
//!
//! rumqttc assigns packet ids when a SUBSCRIBE leaves the request queue, so
//! waiters are queued in request order and bound to a packet id when the
//! matching `Outgoing::Subscribe` event is seen.

use std::collections::{BTreeSet, HashMap, VecDeque};

use tokio::sync::oneshot;

type Waiter = Option<oneshot::Sender<bool>>;

#[derive(Debug, Default)]
pub(crate) struct Subscriptions {
    topics: BTreeSet<String>,
    queued: VecDeque<Waiter>,
    in_flight: HashMap<u16, Waiter>,
}

impl Subscriptions {
    /// Records a requested topic. Returns `false` if it was already known.
    pub(crate) fn remember(&mut self, topic: &str) -> bool {
        self.topics.insert(topic.to_string())
    }

    pub(crate) fn forget(&mut self, topic: &str) {
        self.topics.remove(topic);
    }

    pub(crate) fn topics(&self) -> Vec<String> {
        self.topics.iter().cloned().collect()
    }

    /// Queues a waiter for a SUBSCRIBE that was just handed to the client.
    /// Replayed subscriptions queue `None`.
    pub(crate) fn queue(&mut self, waiter: Waiter) {
        self.queued.push_back(waiter);
    }

    /// Binds the oldest queued waiter to the packet id rumqttc assigned.
    pub(crate) fn sent(&mut self, pkid: u16) {
        if let Some(waiter) = self.queued.pop_front() {
            self.in_flight.insert(pkid, waiter);
        }
    }

    /// Resolves the waiter for `pkid` with the broker's verdict.
    pub(crate) fn acknowledged(&mut self, pkid: u16, granted: bool) {
        if let Some(Some(tx)) = self.in_flight.remove(&pkid) {
            let _ = tx.send(granted);
        }
    }

    /// Fails the waiters whose SUBSCRIBE already went out on a connection
    /// that is now gone.
    ///
    /// Queued waiters stay: their requests are still in the client's queue
    /// and bind to packet ids once they are sent on the next connection.
    pub(crate) fn fail_in_flight(&mut self) {
        for tx in self.in_flight.drain().filter_map(|(_, w)| w) {
            let _ = tx.send(false);
        }
    }

    /// Fails every outstanding waiter, queued or sent. Topics are kept.
    pub(crate) fn fail_all(&mut self) {
        self.fail_in_flight();
        for tx in self.queued.drain(..).flatten() {
            let _ = tx.send(false);
        }
    }

    /// Number of SUBSCRIBE requests not yet seen leaving the queue.
    #[cfg(test)]
    pub(crate) fn unsent(&self) -> usize {
        self.queued.len()
    }
}
