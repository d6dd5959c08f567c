// SPDX-FileCopyrightText: 2026 Rakan Tani Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The UAT session: one farmer's chat, feedback, and schedule over a
//! shared transport.
//!
//! Requests always subscribe to their response topic first and wait (up
//! to the configured timeout) for the broker to confirm before
//! publishing. Every feed reads the transport's log through its own
//! cursors, so [`UatSession::evaluate`] only touches new entries.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rakan_core::envelope::{HistoryRequest, Request, ScheduleRequest, UpdateStepRequest};
use rakan_core::topic::{CHAT, CHAT_REPLY, FEEDBACK, HISTORY, SCHEDULE, UPDATE_STEP};
use rakan_core::{ConnectionState, LogReader, Notice, RakanError, SessionId, SubscribeAck, Transport};
use rakan_identity::IdentityContext;
use rakan_schedule::node_id_to_hlt;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};

use crate::chat::{ChatReplyFeed, Conversation, compose_client_message};
use crate::feedback::{FeedbackForm, Verdict};
use crate::history::{HistoryFeed, ReplayIdentity, messages_from_history};
use crate::schedule::ScheduleFeed;

/// Tunables for a session.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Business number the assistant answers from.
    pub phone_number_id: String,
    /// History entries replayed at start.
    pub history_limit: usize,
    /// How long a request waits for its subscription to be confirmed.
    pub subscribe_timeout: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            phone_number_id: "603884736138857".to_string(),
            history_limit: 5,
            subscribe_timeout: Duration::from_secs(5),
        }
    }
}

pub struct UatSession {
    transport: Arc<dyn Transport>,
    log: LogReader,
    session_id: SessionId,
    phone: String,
    farmer_id: i64,
    jwt: SecretString,
    settings: SessionSettings,
    conversation: Conversation,
    history: HistoryFeed,
    replies: ChatReplyFeed,
    forms: Vec<FeedbackForm>,
    schedule: ScheduleFeed,
    started: bool,
}

impl UatSession {
    pub fn new(
        transport: Arc<dyn Transport>,
        identity: &IdentityContext,
        settings: SessionSettings,
    ) -> Self {
        let session_id = identity.id().clone();
        Self {
            log: transport.log(),
            transport,
            history: HistoryFeed::new(&session_id),
            schedule: ScheduleFeed::new(&session_id),
            replies: ChatReplyFeed::new(identity.phone_number()),
            phone: identity.phone_number().to_string(),
            farmer_id: identity.farmer_id(),
            jwt: SecretString::from(identity.jwt().to_string()),
            session_id,
            settings,
            conversation: Conversation::new(),
            forms: Vec::new(),
            started: false,
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn farmer_id(&self) -> i64 {
        self.farmer_id
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn schedule(&self) -> &ScheduleFeed {
        &self.schedule
    }

    /// Feedback form for the assistant reply at `index`.
    pub fn feedback_form(&self, index: usize) -> Option<&FeedbackForm> {
        self.forms.get(index)
    }

    pub fn feedback_form_mut(&mut self, index: usize) -> Option<&mut FeedbackForm> {
        self.forms.get_mut(index)
    }

    /// The client exists but its last connection attempt was refused,
    /// which in practice means the session token has expired.
    pub fn access_expired(&self) -> bool {
        self.transport.is_client_ready()
            && *self.transport.connection().borrow() == ConnectionState::Failed
    }

    async fn confirm(&self, pending: Vec<(String, SubscribeAck)>) {
        for (topic, ack) in pending {
            if !ack.confirmed(self.settings.subscribe_timeout).await {
                warn!(topic = %topic, "subscription not confirmed, publishing anyway");
            }
        }
    }

    fn subscribe(&self, topic: String) -> (String, SubscribeAck) {
        let ack = self.transport.subscribe(&topic);
        (topic, ack)
    }

    async fn publish<T: serde::Serialize>(&self, topic: &str, request: &Request<T>) -> Result<(), RakanError> {
        self.transport.publish(topic, &request.to_payload()?).await
    }

    /// Subscribes to the session's feeds and requests history, then the
    /// farmer schedule when the farmer is known. Runs once.
    pub async fn start(&mut self) -> Result<(), RakanError> {
        if self.started {
            return Ok(());
        }
        if !self.transport.is_connected() {
            return Err(RakanError::Transport {
                message: "cannot start session while disconnected".into(),
                source: None,
            });
        }
        self.started = true;

        let pending = vec![
            self.subscribe(CHAT_REPLY.to_string()),
            self.subscribe(self.history.topic().to_string()),
            self.subscribe(format!("{FEEDBACK}/+")),
        ];
        self.confirm(pending).await;

        let request = Request::new(
            self.session_id.as_str(),
            HistoryRequest {
                farmer_id: self.farmer_id,
            },
        );
        self.publish(HISTORY, &request).await?;
        info!(session = %self.session_id, "history requested");

        if self.farmer_id >= 0 {
            self.request_schedule().await?;
        } else {
            debug!(session = %self.session_id, "farmer unknown, schedule not requested");
        }
        Ok(())
    }

    /// Requests the farmer's schedule.
    pub async fn request_schedule(&mut self) -> Result<(), RakanError> {
        let pending = vec![
            self.subscribe(self.schedule.schedule_topic().to_string()),
            self.subscribe(self.schedule.update_topic().to_string()),
        ];
        self.confirm(pending).await;

        let request = Request::new(
            self.session_id.as_str(),
            ScheduleRequest {
                farmer_id: self.farmer_id,
                jwt: self.jwt.expose_secret().to_string(),
            },
        );
        self.publish(SCHEDULE, &request).await?;
        info!(session = %self.session_id, "schedule requested");
        Ok(())
    }

    /// Sends a chat message and records it locally once published.
    pub async fn send_message(&mut self, text: &str) -> Result<(), RakanError> {
        let message = compose_client_message(text, &self.phone, &self.settings.phone_number_id, Utc::now());
        let payload = serde_json::to_string(&message)?;
        self.transport.publish(CHAT, &payload).await?;
        debug!(context_id = %message.context_id, "chat message sent");
        self.conversation.push_client(message);
        Ok(())
    }

    /// Submits feedback for the reply at `index` from its form's inputs.
    pub async fn submit_feedback(&mut self, index: usize, verdict: Verdict) -> Result<(), RakanError> {
        let reply = self
            .conversation
            .assistant_messages()
            .get(index)
            .ok_or_else(|| RakanError::Internal(format!("no assistant reply at index {index}")))?;
        let form = self
            .forms
            .get(index)
            .ok_or_else(|| RakanError::Internal(format!("no feedback form at index {index}")))?;
        let request = form.request(
            verdict,
            reply,
            self.conversation.query_for(index),
            self.jwt.expose_secret(),
        )?;
        self.publish(FEEDBACK, &request).await?;
        info!(index, %verdict, "feedback submitted");
        Ok(())
    }

    /// Handles a click on a schedule day node.
    pub async fn select_day(&mut self, node_id: &str) -> Result<(), RakanError> {
        let hlt = node_id_to_hlt(node_id)
            .ok_or_else(|| RakanError::Decode(format!("{node_id} is not a day node")))?;
        self.update_day(hlt).await
    }

    /// Asks the backend to move the farmer's current day to `hlt`.
    pub async fn update_day(&mut self, hlt: i64) -> Result<(), RakanError> {
        let request = Request::new(
            self.session_id.as_str(),
            UpdateStepRequest {
                farmer_id: self.farmer_id,
                new_hlt: hlt,
                jwt: self.jwt.expose_secret().to_string(),
            },
        );
        self.publish(UPDATE_STEP, &request).await?;
        info!(hlt, "current day update requested");
        Ok(())
    }

    /// Folds everything that arrived since the last call into session
    /// state. Returns the notices to show. A no-op on an unchanged log.
    pub fn evaluate(&mut self) -> Vec<Notice> {
        let log = self.log.read();
        let mut notices = Vec::new();

        if let Some(entries) = self.history.evaluate(&log) {
            let identity = ReplayIdentity {
                phone: self.phone.clone(),
                farmer_id: self.farmer_id,
                phone_number_id: self.settings.phone_number_id.clone(),
            };
            let replay = messages_from_history(&entries, self.settings.history_limit, &identity);
            self.conversation.load_history(replay);
        }

        notices.extend(self.replies.evaluate(&log, &mut self.conversation));

        let replies = self.conversation.assistant_messages();
        for reply in &replies[self.forms.len()..] {
            self.forms.push(FeedbackForm::new(reply));
        }
        for form in &mut self.forms {
            notices.extend(form.evaluate(&log));
        }

        notices.extend(self.schedule.evaluate(&log));
        notices
    }

    /// Waits for the log to change, then evaluates.
    ///
    /// Returns `None` once the transport is gone.
    pub async fn next_update(&mut self) -> Option<Vec<Notice>> {
        if !self.log.changed().await {
            return None;
        }
        Some(self.evaluate())
    }
}
