// SPDX-FileCopyrightText: 2026 Rakan Tani Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Rakan Tani client.

use thiserror::Error;

/// The primary error type used across the transport, identity, and router crates.
#[derive(Debug, Error)]
pub enum RakanError {
    /// Configuration errors (missing credentials, invalid broker settings).
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport errors (connect, publish, or subscribe failure).
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A publish was attempted with a blank topic or payload.
    #[error("topic or message cannot be empty")]
    EmptyPayload,

    /// The underlying transport client has not been constructed yet.
    #[error("transport client is not initialized")]
    ClientNotReady,

    /// A payload, packet, or token could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Encryption or decryption failed.
    #[error("crypto error: {0}")]
    Crypto(String),

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RakanError {
    /// Wraps a lower-level transport failure.
    pub fn transport<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        RakanError::Transport {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

impl From<serde_json::Error> for RakanError {
    fn from(err: serde_json::Error) -> Self {
        RakanError::Decode(err.to_string())
    }
}
