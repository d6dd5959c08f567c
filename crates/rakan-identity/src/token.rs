// SPDX-FileCopyrightText: 2026 Rakan Tani Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reads the subject claim of a session token.
//!
//! The signature is not verified; the broker verifies the token when it is
//! presented as the connection password.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::Value;

/// Farmer id used when the token is missing or unreadable.
pub const UNKNOWN_FARMER_ID: i64 = -1;

/// Returns the integer `sub` claim, or `None` if the token is malformed.
///
/// `sub` may be a JSON number or a numeric string.
pub fn token_subject(jwt: &str) -> Option<i64> {
    let payload = jwt.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    let claims: Value = serde_json::from_slice(&bytes).ok()?;
    match claims.get("sub")? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Farmer id from the token's subject, [`UNKNOWN_FARMER_ID`] when unavailable.
pub fn farmer_id_from_token(jwt: &str) -> i64 {
    token_subject(jwt).unwrap_or(UNKNOWN_FARMER_ID)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_with(claims: &str) -> String {
        format!(
            "{}.{}.sig",
            URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
            URL_SAFE_NO_PAD.encode(claims)
        )
    }

    #[test]
    fn numeric_subject() {
        assert_eq!(farmer_id_from_token(&token_with(r#"{"sub":42}"#)), 42);
    }

    #[test]
    fn string_subject() {
        assert_eq!(farmer_id_from_token(&token_with(r#"{"sub":"1234"}"#)), 1234);
    }

    #[test]
    fn padded_payload_is_tolerated() {
        let token = token_with(r#"{"sub":7}"#);
        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        parts[1].push_str("==");
        assert_eq!(token_subject(&parts.join(".")), Some(7));
    }

    #[test]
    fn malformed_tokens_yield_unknown() {
        assert_eq!(farmer_id_from_token(""), UNKNOWN_FARMER_ID);
        assert_eq!(farmer_id_from_token("not-a-token"), UNKNOWN_FARMER_ID);
        assert_eq!(farmer_id_from_token("a.!!!.c"), UNKNOWN_FARMER_ID);
        assert_eq!(
            farmer_id_from_token(&token_with(r#"{"sub":"farmer"}"#)),
            UNKNOWN_FARMER_ID
        );
        assert_eq!(
            farmer_id_from_token(&token_with(r#"{"name":"x"}"#)),
            UNKNOWN_FARMER_ID
        );
    }
}
