// SPDX-FileCopyrightText: 2026 Rakan Tani Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Encrypted access packets carried in a session link.
//!
//! Wire form: `base64(nonce[12] || ciphertext || tag[16])`, usually
//! percent-encoded inside a `packet` query parameter. The plaintext is a
//! JSON object with optional `phone` and `jwt` fields.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use percent_encoding::{NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use rakan_core::RakanError;
use ring::aead::NONCE_LEN;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::crypto::{self, PacketKey, TAG_LEN};

/// Decrypted contents of an access packet.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPacket {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwt: Option<String>,
}

impl std::fmt::Debug for AccessPacket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessPacket")
            .field("phone", &self.phone)
            .field("jwt", &self.jwt.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Query parameters a session link may carry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkParams {
    pub packet: Option<String>,
    pub session_id: Option<String>,
}

/// Extracts `packet` and `sessionId` from a link.
///
/// Returns empty params if `link` is not an absolute URL.
pub fn link_params(link: &str) -> LinkParams {
    let Ok(url) = Url::parse(link.trim()) else {
        return LinkParams::default();
    };
    let mut params = LinkParams::default();
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "packet" if params.packet.is_none() => params.packet = Some(value.into_owned()),
            "sessionId" if params.session_id.is_none() => {
                params.session_id = Some(value.into_owned())
            }
            _ => {}
        }
    }
    params
}

/// Decrypts a packet value taken from a link.
///
/// Percent-encoding is undone first. Spaces are read as `+`, since form
/// decoding turns an unescaped `+` into a space.
pub fn decode_packet(raw: &str, key: &PacketKey) -> Result<AccessPacket, RakanError> {
    let decoded = percent_decode_str(raw.trim())
        .decode_utf8()
        .map_err(|e| RakanError::Decode(format!("packet is not valid UTF-8: {e}")))?;
    let normalized = decoded.replace(' ', "+");

    let bytes = STANDARD
        .decode(normalized.as_bytes())
        .map_err(|e| RakanError::Decode(format!("packet is not valid base64: {e}")))?;
    if bytes.len() < NONCE_LEN + TAG_LEN {
        return Err(RakanError::Decode(format!(
            "packet too short: {} bytes",
            bytes.len()
        )));
    }

    let (nonce, ciphertext) = bytes.split_at(NONCE_LEN);
    let mut nonce_bytes = [0u8; NONCE_LEN];
    nonce_bytes.copy_from_slice(nonce);

    let plaintext = crypto::open(key, &nonce_bytes, ciphertext)?;
    Ok(serde_json::from_slice(&plaintext)?)
}

/// Encrypts `packet` into its base64 wire form.
pub fn seal_packet(packet: &AccessPacket, key: &PacketKey) -> Result<String, RakanError> {
    let plaintext = serde_json::to_vec(packet)
        .map_err(|e| RakanError::Internal(format!("failed to serialize packet: {e}")))?;
    let (ciphertext, nonce) = crypto::seal(key, &plaintext)?;

    let mut wire = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    wire.extend_from_slice(&nonce);
    wire.extend_from_slice(&ciphertext);
    Ok(STANDARD.encode(wire))
}

/// Builds a session link with the sealed packet as its `packet` parameter.
pub fn packet_link(base: &str, sealed: &str) -> String {
    let separator = if base.contains('?') { '&' } else { '?' };
    format!(
        "{base}{separator}packet={}",
        utf8_percent_encode(sealed, NON_ALPHANUMERIC)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> PacketKey {
        PacketKey::from_passphrase("test passphrase")
    }

    fn sample() -> AccessPacket {
        AccessPacket {
            phone: Some("60123456789".into()),
            jwt: Some("a.b.c".into()),
        }
    }

    #[test]
    fn sealed_packet_decodes() {
        let sealed = seal_packet(&sample(), &key()).unwrap();
        assert_eq!(decode_packet(&sealed, &key()).unwrap(), sample());
    }

    #[test]
    fn packet_survives_link_roundtrip() {
        let sealed = seal_packet(&sample(), &key()).unwrap();
        let link = packet_link("https://uat.rakantani.my/uat", &sealed);
        let params = link_params(&link);
        assert_eq!(
            decode_packet(params.packet.as_deref().unwrap(), &key()).unwrap(),
            sample()
        );
    }

    #[test]
    fn plus_signs_mangled_to_spaces_are_restored() {
        let mut sealed = seal_packet(&sample(), &key()).unwrap();
        while !sealed.contains('+') {
            sealed = seal_packet(&sample(), &key()).unwrap();
        }
        let mangled = sealed.replace('+', " ");
        assert_eq!(decode_packet(&mangled, &key()).unwrap(), sample());
    }

    #[test]
    fn missing_fields_are_none() {
        let sealed = seal_packet(&AccessPacket::default(), &key()).unwrap();
        let packet = decode_packet(&sealed, &key()).unwrap();
        assert!(packet.phone.is_none());
        assert!(packet.jwt.is_none());
    }

    #[test]
    fn garbage_and_short_input_are_decode_errors() {
        assert!(matches!(
            decode_packet("%%%not base64", &key()),
            Err(RakanError::Decode(_))
        ));
        assert!(matches!(
            decode_packet("AAAA", &key()),
            Err(RakanError::Decode(_))
        ));
    }

    #[test]
    fn wrong_key_is_crypto_error() {
        let sealed = seal_packet(&sample(), &key()).unwrap();
        let other = PacketKey::from_passphrase("other");
        assert!(matches!(
            decode_packet(&sealed, &other),
            Err(RakanError::Crypto(_))
        ));
    }

    #[test]
    fn link_params_reads_session_override() {
        let params = link_params("https://x.my/onboarding?sessionId=123456789012&other=1");
        assert_eq!(params.session_id.as_deref(), Some("123456789012"));
        assert!(params.packet.is_none());
        assert_eq!(link_params("not a url"), LinkParams::default());
    }

    #[test]
    fn debug_hides_token() {
        assert!(!format!("{:?}", sample()).contains("a.b.c"));
    }
}
