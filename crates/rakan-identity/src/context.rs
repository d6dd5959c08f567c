// SPDX-FileCopyrightText: 2026 Rakan Tani Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-session identity: the numeric session id plus the fields carried by
//! the access packet.

use rakan_core::SessionId;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};

use crate::crypto::PacketKey;
use crate::packet::{AccessPacket, decode_packet};
use crate::session_id::generate_session_id;
use crate::token::{UNKNOWN_FARMER_ID, farmer_id_from_token};

/// Session fields decoded from an access packet, applied as one unit.
#[derive(Debug, Clone)]
pub struct SessionFields {
    pub phone_number: String,
    pub farmer_id: i64,
    pub jwt: SecretString,
}

impl From<AccessPacket> for SessionFields {
    fn from(packet: AccessPacket) -> Self {
        let jwt = packet.jwt.unwrap_or_default();
        Self {
            phone_number: packet.phone.unwrap_or_default(),
            farmer_id: farmer_id_from_token(&jwt),
            jwt: SecretString::from(jwt),
        }
    }
}

/// Holds the session identity for the lifetime of one session.
///
/// The id is fixed at construction. Session fields start empty (farmer id
/// `-1`) and are overwritten at most once.
#[derive(Debug)]
pub struct IdentityContext {
    id: SessionId,
    phone_number: String,
    farmer_id: i64,
    jwt: SecretString,
    fields_applied: bool,
}

impl Default for IdentityContext {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityContext {
    /// Creates a context with a freshly generated session id.
    pub fn new() -> Self {
        Self::with_id(generate_session_id())
    }

    /// Creates a context around an existing session id.
    pub fn with_id(id: SessionId) -> Self {
        Self {
            id,
            phone_number: String::new(),
            farmer_id: UNKNOWN_FARMER_ID,
            jwt: SecretString::from(String::new()),
            fields_applied: false,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn phone_number(&self) -> &str {
        &self.phone_number
    }

    /// Subject of the session token, `-1` when unresolved.
    pub fn farmer_id(&self) -> i64 {
        self.farmer_id
    }

    pub fn jwt(&self) -> &str {
        self.jwt.expose_secret()
    }

    /// True once session fields have been applied.
    pub fn has_session_fields(&self) -> bool {
        self.fields_applied
    }

    /// Overwrites phone, farmer id, and token together.
    ///
    /// Returns `false` (and changes nothing) if fields were already applied.
    pub fn apply_fields(&mut self, fields: SessionFields) -> bool {
        if self.fields_applied {
            debug!(session = %self.id, "session fields already applied, ignoring");
            return false;
        }
        self.phone_number = fields.phone_number;
        self.farmer_id = fields.farmer_id;
        self.jwt = fields.jwt;
        self.fields_applied = true;
        info!(
            session = %self.id,
            farmer_id = self.farmer_id,
            "session fields applied"
        );
        true
    }

    /// Decrypts `raw` and applies the resulting fields.
    ///
    /// Decryption failure leaves every field at its initial value.
    pub fn apply_packet(&mut self, raw: &str, key: &PacketKey) -> bool {
        if self.fields_applied {
            return false;
        }
        match decode_packet(raw, key) {
            Ok(packet) => self.apply_fields(packet.into()),
            Err(e) => {
                warn!(session = %self.id, error = %e, "access packet could not be decrypted");
                false
            }
        }
    }
}
