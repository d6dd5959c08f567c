// SPDX-FileCopyrightText: 2026 Rakan Tani Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Schedule projection for the Rakan Tani client.
//!
//! Translates day-by-day activity schedules into flowchart text for the
//! diagram widget, and translates clicked node ids back into day offsets.

pub mod mermaid;
pub mod node_id;
pub mod reference;

pub use mermaid::{farmer_flowchart, mark_selected, reference_flowchart};
pub use node_id::{hlt_to_node_id, node_id_to_hlt};
pub use reference::{ScheduleDay, parse_schedule, reference_schedule};
