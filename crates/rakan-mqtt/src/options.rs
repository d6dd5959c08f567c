// SPDX-FileCopyrightText: 2026 Rakan Tani Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connection options for the two client roles.

use std::time::Duration;

use rakan_config::model::BrokerConfig;
use rakan_core::{RakanError, SessionId};
use rumqttc::{MqttOptions, Transport};
use secrecy::{ExposeSecret, SecretString};
use strum::Display;
use url::Url;

/// Largest packet accepted in either direction. Schedule replies can run
/// well past rumqttc's 10 KiB default.
pub const MAX_PACKET_SIZE: usize = 256 * 1024;

/// Which broker a client talks to, and how it behaves on connection loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ClientRole {
    /// Fixed credentials; no automatic retry.
    Onboard,
    /// Session-token credentials; retries after abnormal loss and replays
    /// every requested subscription on reconnect.
    Uat,
}

impl ClientRole {
    fn client_id_prefix(self) -> &'static str {
        match self {
            ClientRole::Onboard => "onboard-",
            ClientRole::Uat => "uat-",
        }
    }

    /// Whether an abnormal connection loss schedules a reconnect.
    pub fn retries_on_loss(self) -> bool {
        matches!(self, ClientRole::Uat)
    }

    /// Whether the client-held subscription set is replayed after connect.
    pub fn resubscribes(self) -> bool {
        matches!(self, ClientRole::Uat)
    }
}

/// Everything needed to build rumqttc options for one client.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub role: ClientRole,
    pub client_id: String,
    pub url: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
    pub keep_alive: Duration,
    pub reconnect_delay: Duration,
    pub request_capacity: usize,
}

impl ClientSettings {
    /// Onboarding client: fixed username/password from config.
    pub fn onboard(broker: &BrokerConfig, session: &SessionId) -> Self {
        Self {
            role: ClientRole::Onboard,
            client_id: format!("{}{session}", ClientRole::Onboard.client_id_prefix()),
            url: broker.onboard_url.clone(),
            port: broker.onboard_port,
            username: broker.onboard_username.clone(),
            password: SecretString::from(broker.onboard_password.clone()),
            keep_alive: Duration::from_secs(broker.keep_alive_secs),
            reconnect_delay: Duration::from_secs(broker.reconnect_delay_secs),
            request_capacity: broker.request_capacity,
        }
    }

    /// UAT client: empty username, session token as password.
    pub fn uat(broker: &BrokerConfig, session: &SessionId, jwt: &str) -> Result<Self, RakanError> {
        if jwt.trim().is_empty() {
            return Err(RakanError::Config(
                "a session token is required for the UAT broker".into(),
            ));
        }
        Ok(Self {
            role: ClientRole::Uat,
            client_id: format!("{}{session}", ClientRole::Uat.client_id_prefix()),
            url: broker.uat_url.clone(),
            port: broker.uat_port,
            username: String::new(),
            password: SecretString::from(jwt.to_string()),
            keep_alive: Duration::from_secs(broker.keep_alive_secs),
            reconnect_delay: Duration::from_secs(broker.reconnect_delay_secs),
            request_capacity: broker.request_capacity,
        })
    }

    /// Builds rumqttc options. Websocket brokers take the full URL as host.
    pub fn to_mqtt_options(&self) -> Result<MqttOptions, RakanError> {
        let parsed = Url::parse(&self.url)
            .map_err(|e| RakanError::Config(format!("invalid broker url {}: {e}", self.url)))?;
        let transport = match parsed.scheme() {
            "ws" => Transport::Ws,
            "wss" => Transport::wss_with_default_config(),
            other => {
                return Err(RakanError::Config(format!(
                    "unsupported broker scheme '{other}', expected ws or wss"
                )));
            }
        };

        let mut options = MqttOptions::new(self.client_id.clone(), self.url.clone(), self.port);
        options
            .set_transport(transport)
            .set_keep_alive(self.keep_alive)
            .set_clean_session(true)
            .set_max_packet_size(MAX_PACKET_SIZE, MAX_PACKET_SIZE)
            .set_credentials(self.username.clone(), self.password.expose_secret().to_string());
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> SessionId {
        SessionId("123456789012".into())
    }

    #[test]
    fn onboard_settings_use_fixed_credentials() {
        let settings = ClientSettings::onboard(&BrokerConfig::default(), &session());
        assert_eq!(settings.role, ClientRole::Onboard);
        assert_eq!(settings.client_id, "onboard-123456789012");
        assert_eq!(settings.username, "onboard");
        assert_eq!(settings.password.expose_secret(), "onboard");
        assert_eq!(settings.keep_alive, Duration::from_secs(120));
    }

    #[test]
    fn uat_settings_use_token_as_password() {
        let settings = ClientSettings::uat(&BrokerConfig::default(), &session(), "a.b.c").unwrap();
        assert_eq!(settings.client_id, "uat-123456789012");
        assert!(settings.username.is_empty());
        assert_eq!(settings.password.expose_secret(), "a.b.c");
        assert_eq!(settings.reconnect_delay, Duration::from_secs(3));
    }

    #[test]
    fn uat_without_token_is_config_error() {
        assert!(matches!(
            ClientSettings::uat(&BrokerConfig::default(), &session(), " "),
            Err(RakanError::Config(_))
        ));
    }

    #[test]
    fn options_build_for_default_brokers() {
        let options = ClientSettings::onboard(&BrokerConfig::default(), &session())
            .to_mqtt_options()
            .unwrap();
        assert_eq!(options.client_id(), "onboard-123456789012");
        assert_eq!(options.keep_alive(), Duration::from_secs(120));
    }

    #[test]
    fn non_websocket_scheme_is_rejected() {
        let mut settings = ClientSettings::onboard(&BrokerConfig::default(), &session());
        settings.url = "tcp://broker:1883".into();
        assert!(settings.to_mqtt_options().is_err());
    }

    #[test]
    fn role_behavior() {
        assert!(ClientRole::Uat.retries_on_loss());
        assert!(ClientRole::Uat.resubscribes());
        assert!(!ClientRole::Onboard.retries_on_loss());
        assert!(!ClientRole::Onboard.resubscribes());
        assert_eq!(ClientRole::Uat.to_string(), "uat");
    }
}
