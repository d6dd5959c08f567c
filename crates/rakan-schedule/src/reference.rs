// SPDX-FileCopyrightText: 2026 Rakan Tani Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The bundled reference schedule.

use rakan_core::RakanError;
use serde::{Deserialize, Serialize};

const BUNDLED_SCHEDULE: &str = include_str!("../data/schedule.json");

/// One day of the reference schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDay {
    pub hlt: i64,
    pub next_hlt: i64,
    #[serde(default)]
    pub activity: Vec<String>,
    pub activity_id: i64,
}

#[derive(Debug, Deserialize)]
struct ScheduleFile {
    schedule: Vec<ScheduleDay>,
}

/// Parses a schedule document of the form `{"schedule": [...]}`.
pub fn parse_schedule(json: &str) -> Result<Vec<ScheduleDay>, RakanError> {
    let file: ScheduleFile = serde_json::from_str(json)?;
    Ok(file.schedule)
}

/// The reference schedule shipped with the crate, ordered by day.
pub fn reference_schedule() -> Result<Vec<ScheduleDay>, RakanError> {
    parse_schedule(BUNDLED_SCHEDULE)
}
