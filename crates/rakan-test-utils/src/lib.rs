// SPDX-FileCopyrightText: 2026 Rakan Tani Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared test utilities for Rakan Tani integration tests.
//!
//! Provides a mock transport with injectable inbound traffic and canned
//! backend payloads.

pub mod fixtures;
pub mod mock_transport;

pub use mock_transport::{AckBehavior, MockTransport};
