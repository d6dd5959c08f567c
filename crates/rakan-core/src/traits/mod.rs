// SPDX-FileCopyrightText: 2026 Rakan Tani Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait definitions at the transport seam.

pub mod transport;

pub use transport::Transport;
