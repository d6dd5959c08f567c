// SPDX-FileCopyrightText: 2026 Rakan Tani Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-reply feedback form and its acknowledgement feed.
//!
//! Each assistant message owns one [`FeedbackForm`]. The form's request id
//! is derived from the message's `context_id`; the backend acknowledges on
//! `uatfeedback/{requestId}`. Acknowledgements are deduplicated per form by
//! topic and payload.

use std::collections::HashSet;

use rakan_core::envelope::{AckResponse, AssistantMessage, ClientMessage, FeedbackRequest, Request};
use rakan_core::topic::{FEEDBACK, response_topic};
use rakan_core::{MessageLog, Notice, RakanError, TopicCursor};
use strum::Display;
use tracing::{error, info};

use crate::feed::parse;
use crate::wamid::feedback_request_id;

pub const FEEDBACK_SUBMITTED: &str = "Feedback submitted successfully!";

/// Which input panel is open. Good and bad are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
#[strum(serialize_all = "snake_case")]
pub enum FeedbackMode {
    #[default]
    Closed,
    Good,
    Bad,
}

/// The user's verdict on a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Verdict {
    Good,
    Bad,
}

fn satisfied_text(farmer_name: &str) -> String {
    format!("User {farmer_name} was satisfied with response")
}

fn dissatisfied_text(farmer_name: &str) -> String {
    format!("User {farmer_name} was dissatisfied with response")
}

#[derive(Debug)]
pub struct FeedbackForm {
    context_id: String,
    farmer_id: i64,
    farmer_name: String,
    request_id: Option<String>,
    cursor: Option<TopicCursor>,
    processed: HashSet<String>,
    mode: FeedbackMode,
    good_text: String,
    bad_text: String,
    ideal_text: String,
}

impl FeedbackForm {
    pub fn new(reply: &AssistantMessage) -> Self {
        let request_id = feedback_request_id(&reply.context_id).map(str::to_string);
        let cursor = request_id
            .as_deref()
            .map(|id| TopicCursor::new(response_topic(FEEDBACK, id)));
        Self {
            context_id: reply.context_id.clone(),
            farmer_id: reply.farmer_id,
            farmer_name: reply.farmer_name.clone(),
            request_id,
            cursor,
            processed: HashSet::new(),
            mode: FeedbackMode::Closed,
            good_text: String::new(),
            bad_text: String::new(),
            ideal_text: String::new(),
        }
    }

    pub fn context_id(&self) -> &str {
        &self.context_id
    }

    /// `None` when the reply's context id carries no request id.
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    pub fn response_topic(&self) -> Option<&str> {
        self.cursor.as_ref().map(TopicCursor::topic)
    }

    pub fn mode(&self) -> FeedbackMode {
        self.mode
    }

    pub fn toggle_good(&mut self) {
        self.mode = match self.mode {
            FeedbackMode::Good => FeedbackMode::Closed,
            _ => FeedbackMode::Good,
        };
    }

    pub fn toggle_bad(&mut self) {
        self.mode = match self.mode {
            FeedbackMode::Bad => FeedbackMode::Closed,
            _ => FeedbackMode::Bad,
        };
    }

    pub fn set_good_text(&mut self, text: impl Into<String>) {
        self.good_text = text.into();
    }

    pub fn set_bad_text(&mut self, text: impl Into<String>) {
        self.bad_text = text.into();
    }

    pub fn set_ideal_text(&mut self, text: impl Into<String>) {
        self.ideal_text = text.into();
    }

    pub fn good_text(&self) -> &str {
        &self.good_text
    }

    pub fn bad_text(&self) -> &str {
        &self.bad_text
    }

    pub fn ideal_text(&self) -> &str {
        &self.ideal_text
    }

    /// Builds the `uatfeedback` request from the current inputs.
    ///
    /// Blank inputs are replaced by the default satisfied/dissatisfied text.
    pub fn request(
        &self,
        verdict: Verdict,
        reply: &AssistantMessage,
        query: Option<&ClientMessage>,
        jwt: &str,
    ) -> Result<Request<FeedbackRequest>, RakanError> {
        let request_id = self.request_id.clone().ok_or_else(|| {
            RakanError::Decode(format!(
                "context id {} carries no feedback request id",
                self.context_id
            ))
        })?;

        let or_default = |text: &str, fallback: String| {
            if text.trim().is_empty() { fallback } else { text.to_string() }
        };
        let (feedback, ideal_response) = match verdict {
            Verdict::Good => (
                or_default(&self.good_text, satisfied_text(&self.farmer_name)),
                String::new(),
            ),
            Verdict::Bad => (
                or_default(&self.bad_text, dissatisfied_text(&self.farmer_name)),
                or_default(&self.ideal_text, dissatisfied_text(&self.farmer_name)),
            ),
        };

        Ok(Request::new(
            request_id,
            FeedbackRequest {
                farmer_id: self.farmer_id,
                wam_id: self.context_id.clone(),
                query: query.map(|q| q.m.clone()).unwrap_or_default(),
                answer: reply.m.clone(),
                feedback,
                ideal_response,
                jwt: jwt.to_string(),
            },
        ))
    }

    fn clear(&mut self) {
        self.mode = FeedbackMode::Closed;
        self.good_text.clear();
        self.bad_text.clear();
        self.ideal_text.clear();
    }

    /// Handles the newest acknowledgement for this form.
    ///
    /// Success clears the inputs. Failure leaves them for another try.
    pub fn evaluate(&mut self, log: &MessageLog) -> Option<Notice> {
        let msg = self.cursor.as_mut()?.take_latest(log)?;
        let key = format!("{}-{}", msg.topic, msg.message);
        if !self.processed.insert(key) {
            return None;
        }
        let ack: AckResponse = parse(&msg)?;

        if ack.success {
            info!(context_id = %self.context_id, "feedback accepted");
            self.clear();
            Some(Notice::success(FEEDBACK_SUBMITTED))
        } else {
            error!(context_id = %self.context_id, "Failed to submit feedback, please try again.");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rakan_core::{TransportMessage, message_log};

    fn reply() -> AssistantMessage {
        AssistantMessage {
            context_id: "wamid.REQ1=".into(),
            farmer_id: 42,
            farmer_name: "Ali".into(),
            m: "Apply urea".into(),
            ..AssistantMessage::default()
        }
    }

    fn query() -> ClientMessage {
        ClientMessage {
            message_type: "text".into(),
            phone_number_id: "id".into(),
            context_id: "wamid.Q=".into(),
            client_phone: "6012".into(),
            timestamp: "1".into(),
            client_name: String::new(),
            m: "What fertilizer?".into(),
        }
    }

    #[test]
    fn modes_are_mutually_exclusive_toggles() {
        let mut form = FeedbackForm::new(&reply());
        form.toggle_good();
        assert_eq!(form.mode(), FeedbackMode::Good);
        form.toggle_bad();
        assert_eq!(form.mode(), FeedbackMode::Bad);
        form.toggle_bad();
        assert_eq!(form.mode(), FeedbackMode::Closed);
    }

    #[test]
    fn blank_good_feedback_uses_default_text() {
        let form = FeedbackForm::new(&reply());
        let req = form.request(Verdict::Good, &reply(), Some(&query()), "jwt").unwrap();
        assert_eq!(req.request_id, "REQ1");
        assert_eq!(req.data.feedback, "User Ali was satisfied with response");
        assert!(req.data.ideal_response.is_empty());
        assert_eq!(req.data.wam_id, "wamid.REQ1=");
        assert_eq!(req.data.query, "What fertilizer?");
        assert_eq!(req.data.answer, "Apply urea");
        assert_eq!(req.data.farmer_id, 42);
    }

    #[test]
    fn bad_feedback_defaults_both_fields() {
        let mut form = FeedbackForm::new(&reply());
        form.set_bad_text("Too vague");
        let req = form.request(Verdict::Bad, &reply(), None, "jwt").unwrap();
        assert_eq!(req.data.feedback, "Too vague");
        assert_eq!(req.data.ideal_response, "User Ali was dissatisfied with response");
        assert!(req.data.query.is_empty());
    }

    #[test]
    fn reply_without_request_id_cannot_be_rated() {
        let mut msg = reply();
        msg.context_id = "opaque".into();
        let form = FeedbackForm::new(&msg);
        assert!(form.response_topic().is_none());
        assert!(form.request(Verdict::Good, &msg, None, "jwt").is_err());
    }

    #[test]
    fn success_ack_clears_inputs_once() {
        let (writer, reader) = message_log();
        let mut form = FeedbackForm::new(&reply());
        form.toggle_bad();
        form.set_bad_text("x");
        form.set_ideal_text("y");

        writer.append(TransportMessage::new("uatfeedback/OTHER", r#"{"success":true}"#));
        assert!(form.evaluate(&reader.read()).is_none());

        writer.append(TransportMessage::new("uatfeedback/REQ1", r#"{"success":true}"#));
        assert_eq!(form.evaluate(&reader.read()), Some(Notice::success(FEEDBACK_SUBMITTED)));
        assert_eq!(form.mode(), FeedbackMode::Closed);
        assert!(form.bad_text().is_empty());
        assert!(form.ideal_text().is_empty());

        // identical redelivery is ignored
        writer.append(TransportMessage::new("uatfeedback/REQ1", r#"{"success":true}"#));
        assert!(form.evaluate(&reader.read()).is_none());
    }

    #[test]
    fn failed_ack_keeps_inputs() {
        let (writer, reader) = message_log();
        let mut form = FeedbackForm::new(&reply());
        form.toggle_good();
        form.set_good_text("nice");
        writer.append(TransportMessage::new("uatfeedback/REQ1", r#"{"success":false}"#));
        assert!(form.evaluate(&reader.read()).is_none());
        assert_eq!(form.mode(), FeedbackMode::Good);
        assert_eq!(form.good_text(), "nice");
    }
}
