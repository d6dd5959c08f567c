// SPDX-FileCopyrightText: 2026 Rakan Tani Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Rakan Tani client.
//!
//! This crate provides the error type, the wire envelopes exchanged with
//! the advisory backend, topic naming, the append-only message log, and
//! the [`Transport`] trait that the MQTT client implements.

pub mod envelope;
pub mod error;
pub mod log;
pub mod topic;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::RakanError;
pub use log::{message_log, LogReader, LogWriter, MessageLog, TopicCursor};
pub use traits::Transport;
pub use types::{ConnectionState, Notice, SessionId, SubscribeAck, TransportMessage};
