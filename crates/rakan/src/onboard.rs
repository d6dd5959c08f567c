// SPDX-FileCopyrightText: 2026 Rakan Tani Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `rakan onboard` command implementation.
//!
//! Fills the onboarding form from flags, validates it, and publishes it
//! over an onboarding-role connection. Missing fields are reported with
//! the same per-field messages the form shows.

use clap::Args;
use colored::Colorize;
use rakan_config::RakanConfig;
use rakan_core::{ConnectionState, Notice, RakanError, Transport};
use rakan_identity::{generate_session_id, link_params};
use rakan_mqtt::{ClientSettings, MqttTransport};
use rakan_router::{LatLng, OnboardingForm, RiceType, Submission};
use rakan_schedule::{hlt_to_node_id, reference_flowchart, reference_schedule};
use tracing::{info, warn};

use crate::establish;

#[derive(Args, Debug, Default)]
pub struct OnboardArgs {
    /// Farmer's name.
    #[arg(long)]
    pub name: Option<String>,
    /// Plot latitude.
    #[arg(long, allow_negative_numbers = true)]
    pub lat: Option<f64>,
    /// Plot longitude.
    #[arg(long, allow_negative_numbers = true)]
    pub lng: Option<f64>,
    /// Variety code: 0 = MR220 CL2, 1 = MR47, 2 = MRQ76.
    #[arg(long)]
    pub rice_type: Option<u8>,
    /// Current stage as days relative to transplanting.
    #[arg(long, allow_negative_numbers = true)]
    pub day: Option<i64>,
    /// Onboarding link; its `sessionId` parameter overrides the session id.
    #[arg(long)]
    pub link: Option<String>,
}

/// Builds the form exactly as a user clicking through the page would.
pub fn form_from_args(args: &OnboardArgs) -> Result<(OnboardingForm, Vec<Notice>), RakanError> {
    let chart = reference_flowchart(&reference_schedule()?);
    let mut form = OnboardingForm::with_chart(chart);
    let mut notices = Vec::new();

    if let Some(name) = &args.name {
        form.name = name.clone();
    }
    if let (Some(lat), Some(lng)) = (args.lat, args.lng) {
        form.location = Some(LatLng { lat, lng });
    }
    if let Some(code) = args.rice_type {
        form.rice_type = RiceType::from_code(code);
        if form.rice_type.is_none() {
            warn!(code, "unknown rice type code");
        }
    }
    if let Some(day) = args.day {
        notices.extend(form.select_day(&hlt_to_node_id(day)));
    }
    if let Some(session) = args.link.as_deref().and_then(|l| link_params(l).session_id) {
        if !form.set_session_override(&session) {
            warn!(session = %session, "ignoring invalid sessionId in link");
        }
    }
    Ok((form, notices))
}

fn print_notice(notice: &Notice) {
    if notice.is_error() {
        eprintln!("{}", notice.text().red());
    } else {
        println!("{}", notice.text().green());
    }
}

/// Runs the `rakan onboard` command.
pub async fn run_onboard(config: &RakanConfig, args: OnboardArgs) -> Result<(), RakanError> {
    let (form, notices) = form_from_args(&args)?;
    notices.iter().for_each(print_notice);

    let errors = form.validate();
    if !errors.is_empty() {
        for message in errors.messages() {
            eprintln!("  {} {message}", "-".red());
        }
        print_notice(&errors.notice());
        return Err(RakanError::Config("onboarding form is incomplete".into()));
    }

    let session = generate_session_id();
    let transport = MqttTransport::new(ClientSettings::onboard(&config.broker, &session))?;
    match establish(&transport).await? {
        ConnectionState::Connected => info!(session = %session, "onboarding client connected"),
        state => {
            return Err(RakanError::Transport {
                message: format!("onboarding broker unreachable (state: {state})"),
                source: None,
            });
        }
    }

    let submission = form.submit(&transport, &session).await;
    print_notice(&submission.notice());
    transport.disconnect().await;

    match submission {
        Submission::PublishFailed(e) => Err(e),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_fill_every_field() {
        let args = OnboardArgs {
            name: Some("Siti".into()),
            lat: Some(5.4),
            lng: Some(100.3),
            rice_type: Some(0),
            day: Some(-7),
            link: Some("https://onboard.example/?sessionId=987654321".into()),
        };
        let (form, notices) = form_from_args(&args).unwrap();
        assert_eq!(notices, vec![Notice::success("Day -7 selected!")]);
        assert!(form.validate().is_empty());
        assert_eq!(form.rice_type, Some(RiceType::Mr220Cl2));
        assert!(form.chart().unwrap().contains("class d_997 selected"));

        let request = form.to_request(&generate_session_id()).unwrap();
        assert_eq!(request.session_id, 987_654_321);
    }

    #[test]
    fn missing_flags_leave_fields_empty() {
        let args = OnboardArgs {
            lat: Some(5.4),
            rice_type: Some(9),
            ..OnboardArgs::default()
        };
        let (form, notices) = form_from_args(&args).unwrap();
        assert!(notices.is_empty());
        assert_eq!(form.validate().messages().len(), 4);
    }
}
