// SPDX-FileCopyrightText: 2026 Rakan Tani Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session identity for the Rakan Tani client.
//!
//! - Numeric session ids (12 digits, no leading zero)
//! - AES-256-GCM access packets carried in session links
//! - Subject extraction from the session token (unverified)
//! - [`IdentityContext`], which holds all of the above for one session

pub mod context;
pub mod crypto;
pub mod packet;
pub mod session_id;
pub mod token;

pub use context::{IdentityContext, SessionFields};
pub use crypto::PacketKey;
pub use packet::{AccessPacket, LinkParams, decode_packet, link_params, packet_link, seal_packet};
pub use session_id::{SESSION_ID_LEN, generate_session_id, parse_session_id};
pub use token::{UNKNOWN_FARMER_ID, farmer_id_from_token, token_subject};
