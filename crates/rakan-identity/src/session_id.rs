// SPDX-FileCopyrightText: 2026 Rakan Tani Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Numeric session id generation.

use rakan_core::SessionId;
use rand::Rng;
use uuid::Uuid;

/// Number of digits in every session id.
pub const SESSION_ID_LEN: usize = 12;

/// Generates a fresh 12-digit session id that never starts with `0`.
///
/// Digits are drawn from random UUIDs until enough have accumulated.
pub fn generate_session_id() -> SessionId {
    let mut digits = String::with_capacity(SESSION_ID_LEN * 2);
    while digits.len() < SESSION_ID_LEN {
        digits.extend(
            Uuid::new_v4()
                .simple()
                .to_string()
                .chars()
                .filter(char::is_ascii_digit),
        );
    }
    digits.truncate(SESSION_ID_LEN);

    if digits.starts_with('0') {
        let lead = rand::thread_rng().gen_range(1..=9u8);
        digits.replace_range(0..1, &lead.to_string());
    }
    SessionId(digits)
}

/// Parses a session id supplied from outside (e.g. a link parameter).
///
/// Accepts only non-empty ASCII digit strings without a leading zero.
pub fn parse_session_id(raw: &str) -> Option<SessionId> {
    let raw = raw.trim();
    let valid = !raw.is_empty()
        && raw.bytes().all(|b| b.is_ascii_digit())
        && !raw.starts_with('0')
        && raw.parse::<u64>().is_ok();
    valid.then(|| SessionId(raw.to_string()))
}
