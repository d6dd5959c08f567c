// SPDX-FileCopyrightText: 2026 Rakan Tani Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Synthetic WhatsApp message ids and the feedback request ids derived
//! from them.

use rand::Rng;
use rand::distributions::Alphanumeric;

const WAMID_BODY_LEN: usize = 48;

/// Generates a unique `wamid.<alphanumeric>=` id.
pub fn generate_wamid() -> String {
    let body: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(WAMID_BODY_LEN)
        .map(char::from)
        .collect();
    format!("wamid.{body}=")
}

/// The feedback request id embedded in a context id: the text after the
/// first `.`, up to the next `.` or `=`.
///
/// Returns `None` when the context id has no such segment, which means
/// feedback cannot be correlated for that message.
pub fn feedback_request_id(context_id: &str) -> Option<&str> {
    let (_, rest) = context_id.split_once('.')?;
    let segment = rest.split('.').next()?;
    let id = segment.split('=').next()?;
    (!id.is_empty()).then_some(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_have_wamid_shape() {
        let id = generate_wamid();
        assert!(id.starts_with("wamid."));
        assert!(id.ends_with('='));
        assert_eq!(id.len(), "wamid.".len() + WAMID_BODY_LEN + 1);
        assert_ne!(id, generate_wamid());
    }

    #[test]
    fn request_id_is_between_dot_and_equals() {
        assert_eq!(
            feedback_request_id("wamid.HBgLMTUxMDgxNjI2NTgVAgASGBQz=="),
            Some("HBgLMTUxMDgxNjI2NTgVAgASGBQz")
        );
        assert_eq!(feedback_request_id("wamid.abc"), Some("abc"));
        assert_eq!(feedback_request_id("wamid.abc.def="), Some("abc"));
    }

    #[test]
    fn generated_id_yields_its_body() {
        let id = generate_wamid();
        let body = &id["wamid.".len()..id.len() - 1];
        assert_eq!(feedback_request_id(&id), Some(body));
    }

    #[test]
    fn ids_without_segment_have_no_request_id() {
        assert_eq!(feedback_request_id("plain"), None);
        assert_eq!(feedback_request_id("wamid.="), None);
        assert_eq!(feedback_request_id(""), None);
    }
}
