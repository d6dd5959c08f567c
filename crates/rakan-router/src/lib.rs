// SPDX-FileCopyrightText: 2026 Rakan Tani Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message correlation for the Rakan Tani client.
//!
//! The transport gives no request/response pairing. Each feed here
//! selects its entries from the shared message log by topic (and, for
//! chat replies, by phone number), consumes only what arrived since its
//! last evaluation, deduplicates, and folds the result into local state:
//!
//! - [`history`]: one-time replay of past exchanges
//! - [`chat`]: the conversation and the reply stream
//! - [`feedback`]: per-reply feedback forms and their acknowledgements
//! - [`schedule`]: the farmer schedule and current-day updates
//! - [`onboarding`]: the onboarding form
//! - [`session`]: ties the feeds to a transport for one UAT session

pub mod chat;
mod feed;
pub mod feedback;
pub mod history;
pub mod onboarding;
pub mod schedule;
pub mod session;
pub mod wamid;

pub use chat::{ChatReplyFeed, Conversation, Turn, compose_client_message, sent_at};
pub use feedback::{FeedbackForm, FeedbackMode, Verdict};
pub use history::{HistoryFeed, HistoryReplay, ReplayIdentity, messages_from_history};
pub use onboarding::{FormErrors, LatLng, OnboardingForm, RiceType, Submission};
pub use schedule::{ScheduleFeed, ScheduleStatus};
pub use session::{SessionSettings, UatSession};
pub use wamid::{feedback_request_id, generate_wamid};
