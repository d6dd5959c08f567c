// SPDX-FileCopyrightText: 2026 Rakan Tani Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Farmer schedule feed: fetch results and current-day update acks.

use rakan_core::envelope::{ScheduleResponse, UpdateStepResponse, UserScheduleDay};
use rakan_core::topic::{SCHEDULE, UPDATE_STEP, response_topic};
use rakan_core::{MessageLog, Notice, SessionId, TopicCursor};
use rakan_schedule::{farmer_flowchart, mark_selected};
use strum::Display;
use tracing::{debug, info};

use crate::feed::parse;

/// What the schedule view can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ScheduleStatus {
    /// No response yet.
    Loading,
    /// A chart is available.
    Ready,
    /// The backend returned no schedule for this farmer.
    Unavailable,
}

#[derive(Debug)]
pub struct ScheduleFeed {
    schedule: TopicCursor,
    updates: TopicCursor,
    days: Vec<UserScheduleDay>,
    chart: Option<String>,
    status: ScheduleStatus,
    version: u64,
}

impl ScheduleFeed {
    pub fn new(session: &SessionId) -> Self {
        Self {
            schedule: TopicCursor::new(response_topic(SCHEDULE, session.as_str())),
            updates: TopicCursor::new(response_topic(UPDATE_STEP, session.as_str())),
            days: Vec::new(),
            chart: None,
            status: ScheduleStatus::Loading,
            version: 0,
        }
    }

    pub fn schedule_topic(&self) -> &str {
        self.schedule.topic()
    }

    pub fn update_topic(&self) -> &str {
        self.updates.topic()
    }

    pub fn days(&self) -> &[UserScheduleDay] {
        &self.days
    }

    /// Current chart text, including any `selected` highlight.
    pub fn chart(&self) -> Option<&str> {
        self.chart.as_deref()
    }

    pub fn status(&self) -> ScheduleStatus {
        self.status
    }

    /// Bumped on every state change; stable while the log is unchanged.
    pub fn version(&self) -> u64 {
        self.version
    }

    fn set_status(&mut self, status: ScheduleStatus) {
        if self.status != status {
            self.status = status;
            self.version += 1;
        }
    }

    pub fn evaluate(&mut self, log: &MessageLog) -> Option<Notice> {
        self.evaluate_schedule(log);
        self.evaluate_update(log)
    }

    fn evaluate_schedule(&mut self, log: &MessageLog) {
        let Some(msg) = self.schedule.take_latest(log) else {
            return;
        };
        let Some(response) = parse::<ScheduleResponse>(&msg) else {
            return;
        };

        if response.result == self.days {
            debug!("schedule unchanged");
            if self.days.is_empty() {
                self.set_status(ScheduleStatus::Unavailable);
            }
            return;
        }

        self.days = response.result;
        self.chart = farmer_flowchart(&self.days);
        self.version += 1;
        match self.chart {
            Some(_) => {
                info!(days = self.days.len(), "farmer schedule updated");
                self.set_status(ScheduleStatus::Ready);
            }
            None => {
                info!("no farmer schedule found");
                self.set_status(ScheduleStatus::Unavailable);
            }
        }
    }

    fn evaluate_update(&mut self, log: &MessageLog) -> Option<Notice> {
        let msg = self.updates.take_latest(log)?;
        let response: UpdateStepResponse = parse(&msg)?;
        let step = match (response.success, response.result) {
            (true, Some(step)) => step,
            _ => {
                info!("current day update rejected");
                return None;
            }
        };

        if let Some(chart) = self.chart.as_deref() {
            self.chart = Some(mark_selected(chart, step.hlt));
            self.version += 1;
        }
        info!(hlt = step.hlt, "current day updated");
        Some(Notice::success(format!("Current day updated to {}", step.hlt)))
    }
}
