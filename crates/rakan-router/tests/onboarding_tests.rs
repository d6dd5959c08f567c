// SPDX-FileCopyrightText: 2026 Rakan Tani Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use rakan_core::{Notice, SessionId};
use rakan_router::{LatLng, OnboardingForm, RiceType, Submission};
use rakan_schedule::{reference_flowchart, reference_schedule};
use rakan_test_utils::MockTransport;
use rakan_test_utils::fixtures::TEST_SESSION;

fn session() -> SessionId {
    SessionId(TEST_SESSION.into())
}

#[tokio::test]
async fn empty_form_is_rejected_without_publishing() {
    let mock = MockTransport::connected();
    let submission = OnboardingForm::new().submit(&mock, &session()).await;

    let Submission::Rejected(errors) = &submission else {
        panic!("expected rejection, got {submission:?}");
    };
    assert_eq!(errors.messages().len(), 4);
    assert_eq!(submission.notice(), Notice::error("Please fill in all fields before saving!"));
    assert!(mock.published().is_empty());
}

#[tokio::test]
async fn complete_form_publishes_onboard_payload() {
    let mock = MockTransport::connected();
    let chart = reference_flowchart(&reference_schedule().unwrap());
    let mut form = OnboardingForm::with_chart(chart);
    form.name = "Siti".into();
    form.location = Some(LatLng { lat: 5.4, lng: 100.3 });
    form.rice_type = Some(RiceType::Mrq76);
    assert_eq!(form.select_day("d_997"), Some(Notice::success("Day -7 selected!")));

    let submission = form.submit(&mock, &session()).await;
    assert!(matches!(submission, Submission::Saved));
    assert_eq!(submission.notice(), Notice::success("Information saved successfully!"));

    let sent = mock.last_published_json("onboard").unwrap();
    assert_eq!(sent["sessionId"], 123_456_789_012u64);
    assert_eq!(sent["hlt"], -7);
    assert_eq!(sent["name"], "Siti");
    assert_eq!(sent["ricetype"], 2);
    assert_eq!(sent["location"]["x"], 100.3);
    assert_eq!(sent["location"]["y"], 5.4);
}

#[tokio::test]
async fn publish_failure_is_reported() {
    let mock = MockTransport::connected();
    mock.fail_publishes(true);
    let mut form = OnboardingForm::new();
    form.name = "Siti".into();
    form.location = Some(LatLng { lat: 5.4, lng: 100.3 });
    form.current_stage = Some(0);
    form.rice_type = Some(RiceType::Mr47);

    let submission = form.submit(&mock, &session()).await;
    assert!(matches!(submission, Submission::PublishFailed(_)));
    let notice = submission.notice();
    assert!(notice.is_error());
    assert!(notice.text().starts_with("Error publishing to MQTT:"));
}
