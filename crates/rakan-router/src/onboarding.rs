// SPDX-FileCopyrightText: 2026 Rakan Tani Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The onboarding form: validation, day selection, and submission.

use rakan_core::envelope::{Location, OnboardRequest};
use rakan_core::topic::ONBOARD;
use rakan_core::{Notice, RakanError, SessionId, Transport};
use rakan_identity::parse_session_id;
use rakan_schedule::{mark_selected, node_id_to_hlt};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use tracing::{error, info};

pub const NAME_REQUIRED: &str = "Name is required";
pub const LOCATION_REQUIRED: &str = "Location is required";
pub const STAGE_REQUIRED: &str = "Current stage is required";
pub const RICE_TYPE_REQUIRED: &str = "Rice type is required";
pub const INCOMPLETE_FORM: &str = "Please fill in all fields before saving!";
pub const SAVED: &str = "Information saved successfully!";

/// Supported rice varieties. The discriminant is the wire code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum RiceType {
    #[strum(serialize = "MR220 CL2")]
    Mr220Cl2 = 0,
    #[strum(serialize = "MR47")]
    Mr47 = 1,
    #[strum(serialize = "MRQ76")]
    Mrq76 = 2,
}

impl RiceType {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        RiceType::iter().find(|t| t.code() == code)
    }
}

/// A point picked on the map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// Per-field validation messages. `None` means the field is fine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    pub name: Option<&'static str>,
    pub location: Option<&'static str>,
    pub current_stage: Option<&'static str>,
    pub rice_type: Option<&'static str>,
}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.messages().is_empty()
    }

    pub fn messages(&self) -> Vec<&'static str> {
        [self.name, self.location, self.current_stage, self.rice_type]
            .into_iter()
            .flatten()
            .collect()
    }

    /// The aggregate notice shown next to the inline errors.
    pub fn notice(&self) -> Notice {
        Notice::error(INCOMPLETE_FORM)
    }
}

/// Result of a submission attempt.
#[derive(Debug)]
pub enum Submission {
    /// Validation failed; nothing was published.
    Rejected(FormErrors),
    Saved,
    PublishFailed(RakanError),
}

impl Submission {
    pub fn notice(&self) -> Notice {
        match self {
            Submission::Rejected(errors) => errors.notice(),
            Submission::Saved => Notice::success(SAVED),
            Submission::PublishFailed(e) => Notice::error(format!("Error publishing to MQTT: {e}")),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct OnboardingForm {
    pub name: String,
    pub location: Option<LatLng>,
    pub current_stage: Option<i64>,
    pub rice_type: Option<RiceType>,
    session_override: Option<SessionId>,
    chart: Option<String>,
}

impl OnboardingForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts the form with the reference chart the user picks a day from.
    pub fn with_chart(chart: String) -> Self {
        Self {
            chart: Some(chart),
            ..Self::default()
        }
    }

    /// Uses `raw` as the submitted session id when it is a valid id.
    pub fn set_session_override(&mut self, raw: &str) -> bool {
        self.session_override = parse_session_id(raw);
        self.session_override.is_some()
    }

    pub fn chart(&self) -> Option<&str> {
        self.chart.as_deref()
    }

    /// Handles a click on a day node: records the stage and moves the
    /// highlight. Non-day nodes are ignored.
    pub fn select_day(&mut self, node_id: &str) -> Option<Notice> {
        let hlt = node_id_to_hlt(node_id)?;
        self.current_stage = Some(hlt);
        if let Some(chart) = self.chart.as_deref() {
            self.chart = Some(mark_selected(chart, hlt));
        }
        Some(Notice::success(format!("Day {hlt} selected!")))
    }

    pub fn validate(&self) -> FormErrors {
        FormErrors {
            name: self.name.trim().is_empty().then_some(NAME_REQUIRED),
            location: self.location.is_none().then_some(LOCATION_REQUIRED),
            current_stage: self.current_stage.is_none().then_some(STAGE_REQUIRED),
            rice_type: self.rice_type.is_none().then_some(RICE_TYPE_REQUIRED),
        }
    }

    /// Builds the `onboard` payload, or the field errors.
    pub fn to_request(&self, session: &SessionId) -> Result<OnboardRequest, FormErrors> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(errors);
        }
        let (Some(location), Some(hlt), Some(rice_type)) =
            (self.location, self.current_stage, self.rice_type)
        else {
            return Err(errors);
        };

        let session = self.session_override.as_ref().unwrap_or(session);
        let session_id = session.as_str().parse::<u64>().unwrap_or_default();
        Ok(OnboardRequest {
            session_id,
            hlt,
            name: self.name.trim().to_string(),
            ricetype: rice_type.code(),
            location: Location {
                x: location.lng,
                y: location.lat,
            },
        })
    }

    /// Validates and publishes the form on `onboard`.
    pub async fn submit(&self, transport: &dyn Transport, session: &SessionId) -> Submission {
        let request = match self.to_request(session) {
            Ok(request) => request,
            Err(errors) => return Submission::Rejected(errors),
        };
        let payload = match serde_json::to_string(&request) {
            Ok(payload) => payload,
            Err(e) => return Submission::PublishFailed(e.into()),
        };

        match transport.publish(ONBOARD, &payload).await {
            Ok(()) => {
                info!(session_id = request.session_id, hlt = request.hlt, "onboarding submitted");
                Submission::Saved
            }
            Err(e) => {
                error!(error = %e, "onboarding publish failed");
                Submission::PublishFailed(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn complete() -> OnboardingForm {
        OnboardingForm {
            name: "Ali".into(),
            location: Some(LatLng { lat: 3.1, lng: 101.6 }),
            current_stage: Some(-7),
            rice_type: Some(RiceType::Mr47),
            ..OnboardingForm::default()
        }
    }

    #[test]
    fn empty_form_has_four_errors() {
        let errors = OnboardingForm::new().validate();
        assert_eq!(
            errors.messages(),
            vec![NAME_REQUIRED, LOCATION_REQUIRED, STAGE_REQUIRED, RICE_TYPE_REQUIRED]
        );
        assert_eq!(errors.notice(), Notice::error("Please fill in all fields before saving!"));
    }

    #[test]
    fn whitespace_name_is_missing() {
        let mut form = complete();
        form.name = "   ".into();
        assert_eq!(form.validate().messages(), vec![NAME_REQUIRED]);
    }

    #[test]
    fn request_maps_lng_to_x_and_lat_to_y() {
        let req = complete().to_request(&SessionId("123456789012".into())).unwrap();
        assert_eq!(req.session_id, 123_456_789_012);
        assert_eq!(req.location, Location { x: 101.6, y: 3.1 });
        assert_eq!(req.ricetype, 1);
        assert_eq!(req.hlt, -7);
    }

    #[test]
    fn session_override_takes_precedence() {
        let mut form = complete();
        assert!(form.set_session_override("555"));
        let req = form.to_request(&SessionId("123456789012".into())).unwrap();
        assert_eq!(req.session_id, 555);

        assert!(!form.set_session_override("abc"));
        let req = form.to_request(&SessionId("123456789012".into())).unwrap();
        assert_eq!(req.session_id, 123_456_789_012);
    }

    #[test]
    fn selecting_a_day_sets_stage_and_highlight() {
        let mut form = OnboardingForm::with_chart("flowchart TD\n".into());
        let notice = form.select_day("d_995").unwrap();
        assert_eq!(notice, Notice::success("Day -5 selected!"));
        assert_eq!(form.current_stage, Some(-5));
        assert!(form.chart().unwrap().contains("class d_995 selected"));
        assert!(form.select_day("105").is_none());
    }

    #[test]
    fn rice_type_codes_and_names() {
        assert_eq!(RiceType::from_str("MR220 CL2").unwrap(), RiceType::Mr220Cl2);
        assert_eq!(RiceType::Mrq76.code(), 2);
        assert_eq!(RiceType::from_code(1), Some(RiceType::Mr47));
        assert_eq!(RiceType::from_code(3), None);
        assert_eq!(RiceType::Mr220Cl2.to_string(), "MR220 CL2");
    }
}
