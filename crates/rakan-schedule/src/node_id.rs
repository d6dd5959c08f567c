// SPDX-FileCopyrightText: 2026 Rakan Tani Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Day offset <-> flowchart node id codec.
//!
//! Node ids cannot start with a sign, so negative offsets are written as
//! `d_99<abs>`. Decoding is unambiguous as long as no non-negative offset
//! starts with the digits `99`.

const DAY_PREFIX: &str = "d_";
const NEGATIVE_PREFIX: &str = "d_99";

/// Encodes a day offset as a node id.
pub fn hlt_to_node_id(hlt: i64) -> String {
    if hlt < 0 {
        format!("{NEGATIVE_PREFIX}{}", hlt.unsigned_abs())
    } else {
        format!("{DAY_PREFIX}{hlt}")
    }
}

/// Decodes a node id produced by [`hlt_to_node_id`].
///
/// Returns `None` for ids that are not day nodes.
pub fn node_id_to_hlt(node_id: &str) -> Option<i64> {
    if let Some(abs) = node_id.strip_prefix(NEGATIVE_PREFIX) {
        return parse_digits(abs).filter(|v| *v > 0).and_then(i64::checked_neg);
    }
    node_id.strip_prefix(DAY_PREFIX).and_then(parse_digits)
}

/// Parses a bare run of ASCII digits; signs and overflow are rejected.
fn parse_digits(digits: &str) -> Option<i64> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn known_encodings() {
        assert_eq!(hlt_to_node_id(0), "d_0");
        assert_eq!(hlt_to_node_id(45), "d_45");
        assert_eq!(hlt_to_node_id(-7), "d_997");
        assert_eq!(hlt_to_node_id(-21), "d_9921");
    }

    #[test]
    fn non_day_ids_are_rejected() {
        assert_eq!(node_id_to_hlt("105"), None);
        assert_eq!(node_id_to_hlt("d_"), None);
        assert_eq!(node_id_to_hlt("d_abc"), None);
        assert_eq!(node_id_to_hlt("d_-3"), None);
        assert_eq!(node_id_to_hlt("d_+5"), None);
    }

    #[test]
    fn signed_suffixes_after_negative_prefix_are_rejected() {
        assert_eq!(node_id_to_hlt("d_99-5"), None);
        assert_eq!(node_id_to_hlt("d_99+5"), None);
        assert_eq!(node_id_to_hlt("d_99-9223372036854775808"), None);
        assert_eq!(node_id_to_hlt("d_990"), None);
    }

    #[test]
    fn overflowing_offsets_are_rejected() {
        assert_eq!(node_id_to_hlt("d_999223372036854775808"), None);
        assert_eq!(node_id_to_hlt("d_9223372036854775808"), None);
        assert_eq!(node_id_to_hlt("d_999223372036854775807"), Some(-i64::MAX));
    }

    #[test]
    fn ninety_nine_collides_with_negative_prefix() {
        // 99 and above starting with "99" are outside the encodable range
        assert_eq!(hlt_to_node_id(99), "d_99");
        assert_eq!(node_id_to_hlt("d_99"), None);
    }

    proptest! {
        #[test]
        fn round_trip_over_domain_range(hlt in -98i64..99) {
            prop_assert_eq!(node_id_to_hlt(&hlt_to_node_id(hlt)), Some(hlt));
        }

        #[test]
        fn encoding_shape(hlt in -98i64..99) {
            let id = hlt_to_node_id(hlt);
            if hlt < 0 {
                prop_assert_eq!(id, format!("d_99{}", -hlt));
            } else {
                prop_assert_eq!(id, format!("d_{}", hlt));
            }
        }
    }
}
