// SPDX-FileCopyrightText: 2026 Rakan Tani Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire envelopes exchanged over the broker.
//!
//! Field names follow the backend's JSON exactly, including its mix of
//! snake_case and camelCase. Inbound envelopes are lenient: missing
//! fields default and numeric timestamps are accepted as strings.

use serde::{Deserialize, Deserializer, Serialize};

/// A message sent by the farmer (or replayed from history).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientMessage {
    pub message_type: String,
    pub phone_number_id: String,
    pub context_id: String,
    pub client_phone: String,
    /// Unix seconds, string-encoded.
    #[serde(deserialize_with = "string_or_number")]
    pub timestamp: String,
    #[serde(default)]
    pub client_name: String,
    pub m: String,
}

/// A reply from the assistant, received on the shared reply topic.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantMessage {
    pub address: String,
    pub client_name: String,
    pub client_phone: String,
    pub command: String,
    /// Correlation id; also the deduplication key.
    pub context_id: String,
    pub farmer_id: i64,
    pub farmer_name: String,
    pub m: String,
    pub message: String,
    pub message_type: String,
    pub phone_number_id: String,
    pub query_id: i64,
    #[serde(deserialize_with = "string_or_number")]
    pub timestamp: String,
}

/// One query/answer pair from the backend's chat history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub answer: String,
    /// Last modification time: unix seconds or an RFC 3339 timestamp.
    #[serde(default, deserialize_with = "string_or_number")]
    pub modified: String,
}

/// One day of a farmer's dynamic schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserScheduleDay {
    pub hlt: i64,
    #[serde(default)]
    pub activities: Vec<String>,
    /// Parallel to `activities`.
    #[serde(default)]
    pub activity_ids: Vec<i64>,
    pub current_day_hlt: i64,
    #[serde(default)]
    pub activity_date: String,
}

/// Generic request wrapper: `{request_id, data}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request<T> {
    pub request_id: String,
    pub data: T,
}

impl<T: Serialize> Request<T> {
    pub fn new(request_id: impl Into<String>, data: T) -> Self {
        Self {
            request_id: request_id.into(),
            data,
        }
    }

    /// Serialize to the JSON payload string published on the broker.
    pub fn to_payload(&self) -> Result<String, crate::RakanError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRequest {
    pub farmer_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRequest {
    pub farmer_id: i64,
    pub wam_id: String,
    pub query: String,
    pub answer: String,
    pub feedback: String,
    #[serde(rename = "idealResponse")]
    pub ideal_response: String,
    pub jwt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRequest {
    pub farmer_id: i64,
    pub jwt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateStepRequest {
    pub farmer_id: i64,
    pub new_hlt: i64,
    pub jwt: String,
}

/// Map coordinates: `x` is longitude, `y` is latitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub x: f64,
    pub y: f64,
}

/// Onboarding form submission (no `request_id` wrapper).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnboardRequest {
    #[serde(rename = "sessionId")]
    pub session_id: u64,
    pub hlt: i64,
    pub name: String,
    pub ricetype: u8,
    pub location: Location,
}

/// Response on `history/{id}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HistoryResponse {
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

/// Response on `uatfeedback/{id}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AckResponse {
    #[serde(default)]
    pub success: bool,
}

/// Response on `uatschedule/{id}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScheduleResponse {
    #[serde(default)]
    pub result: Vec<UserScheduleDay>,
}

/// Response on `uatupdatestep/{id}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UpdateStepResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub result: Option<UpdatedStep>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UpdatedStep {
    pub hlt: i64,
}

/// Accepts `"1750320079"` or `1750320079` and yields the string form.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Int(i64),
        Float(f64),
        Null(()),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Str(s) => s,
        Raw::Int(i) => i.to_string(),
        Raw::Float(f) => (f as i64).to_string(),
        Raw::Null(()) => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assistant_message_accepts_numeric_timestamp_and_missing_fields() {
        let raw = r#"{"context_id":"wamid.ABC=","client_phone":"60123","m":"hi","timestamp":1750320079,"farmer_id":42}"#;
        let msg: AssistantMessage = serde_json::from_str(raw).unwrap();
        assert_eq!(msg.timestamp, "1750320079");
        assert_eq!(msg.farmer_id, 42);
        assert!(msg.farmer_name.is_empty());
    }

    #[test]
    fn feedback_request_uses_backend_field_names() {
        let req = Request::new(
            "ABC",
            FeedbackRequest {
                farmer_id: 7,
                wam_id: "wamid.ABC=".into(),
                query: "q".into(),
                answer: "a".into(),
                feedback: "f".into(),
                ideal_response: "i".into(),
                jwt: "t".into(),
            },
        );
        let value: serde_json::Value = serde_json::from_str(&req.to_payload().unwrap()).unwrap();
        assert_eq!(value["request_id"], "ABC");
        assert_eq!(value["data"]["idealResponse"], "i");
        assert_eq!(value["data"]["wam_id"], "wamid.ABC=");
    }

    #[test]
    fn history_request_is_camel_case() {
        let req = Request::new("1", HistoryRequest { farmer_id: 3 });
        assert_eq!(
            req.to_payload().unwrap(),
            r#"{"request_id":"1","data":{"farmerId":3}}"#
        );
    }

    #[test]
    fn onboard_request_shape() {
        let req = OnboardRequest {
            session_id: 123456789012,
            hlt: -2,
            name: "Ali".into(),
            ricetype: 1,
            location: Location { x: 101.5, y: 3.1 },
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["sessionId"], 123456789012u64);
        assert_eq!(value["location"]["x"], 101.5);
        assert_eq!(value["ricetype"], 1);
    }

    #[test]
    fn user_schedule_day_parses_camel_case() {
        let raw = r#"{"hlt":0,"activities":["A"],"activityIds":[1],"currentDayHlt":0,"activityDate":"2024-01-01"}"#;
        let day: UserScheduleDay = serde_json::from_str(raw).unwrap();
        assert_eq!(day.activity_ids, vec![1]);
        assert_eq!(day.activity_date, "2024-01-01");
    }

    #[test]
    fn update_step_response_without_result() {
        let resp: UpdateStepResponse = serde_json::from_str(r#"{"success":false}"#).unwrap();
        assert!(!resp.success);
        assert!(resp.result.is_none());
    }
}
