// SPDX-FileCopyrightText: 2026 Rakan Tani Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canned backend payloads and credentials for integration tests.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rakan_identity::{AccessPacket, PacketKey, seal_packet};
use serde_json::json;

pub const TEST_PASSPHRASE: &str = "rakan-test-passphrase";
pub const TEST_PHONE: &str = "60123456789";
pub const TEST_SESSION: &str = "123456789012";

/// An unsigned JWT whose payload carries `sub`.
pub fn token_with_subject(sub: serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(json!({ "sub": sub, "iat": 1_700_000_000 }).to_string());
    format!("{header}.{payload}.c2lnbmF0dXJl")
}

/// A sealed access packet for `phone` and `jwt` under `passphrase`.
pub fn sealed_packet(phone: &str, jwt: &str, passphrase: &str) -> String {
    let packet = AccessPacket {
        phone: Some(phone.to_string()),
        jwt: Some(jwt.to_string()),
    };
    match seal_packet(&packet, &PacketKey::from_passphrase(passphrase)) {
        Ok(sealed) => sealed,
        Err(e) => panic!("sealing a test packet failed: {e}"),
    }
}

/// An assistant reply addressed to `phone`.
pub fn assistant_reply(context_id: &str, phone: &str, text: &str) -> String {
    json!({
        "address": "",
        "client_name": "Ali",
        "client_phone": phone,
        "command": "",
        "context_id": context_id,
        "farmer_id": 42,
        "farmer_name": "Ali",
        "m": text,
        "message": text,
        "message_type": "text",
        "phone_number_id": "603884736138857",
        "query_id": 7,
        "timestamp": 1_750_320_079,
    })
    .to_string()
}

/// A history response; each tuple is `(query, answer, modified)`.
pub fn history_payload(entries: &[(&str, &str, &str)]) -> String {
    let history: Vec<_> = entries
        .iter()
        .map(|(query, answer, modified)| {
            json!({ "query": query, "answer": answer, "modified": modified })
        })
        .collect();
    json!({ "history": history }).to_string()
}

/// A two-day farmer schedule whose current day is `current`.
pub fn schedule_payload(current: i64) -> String {
    json!({
        "result": [
            {
                "hlt": -3,
                "activities": ["Soak seeds"],
                "activityIds": [102],
                "currentDayHlt": current,
                "activityDate": "2024-03-01",
            },
            {
                "hlt": 0,
                "activities": ["Sow", "Flood field"],
                "activityIds": [104, 105],
                "currentDayHlt": current,
                "activityDate": "2024-03-04",
            },
        ]
    })
    .to_string()
}

pub fn update_step_payload(success: bool, hlt: i64) -> String {
    if success {
        json!({ "success": true, "result": { "hlt": hlt } }).to_string()
    } else {
        json!({ "success": false }).to_string()
    }
}

pub fn ack_payload(success: bool) -> String {
    json!({ "success": success }).to_string()
}
