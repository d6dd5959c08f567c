// SPDX-FileCopyrightText: 2026 Rakan Tani Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Rakan Tani client.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};

/// Top-level configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RakanConfig {
    /// Process-level settings.
    #[serde(default)]
    pub app: AppConfig,

    /// Broker endpoints and connection behavior.
    #[serde(default)]
    pub broker: BrokerConfig,

    /// Access packet decryption settings.
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Chat simulation settings.
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Process-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Broker configuration for both client roles.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BrokerConfig {
    /// WebSocket URL of the onboarding broker.
    #[serde(default = "default_onboard_url")]
    pub onboard_url: String,

    #[serde(default = "default_broker_port")]
    pub onboard_port: u16,

    /// Fixed onboarding credentials.
    #[serde(default = "default_onboard_credential")]
    pub onboard_username: String,

    #[serde(default = "default_onboard_credential")]
    pub onboard_password: String,

    /// WebSocket URL of the UAT broker. Credentials come from the session token.
    #[serde(default = "default_uat_url")]
    pub uat_url: String,

    #[serde(default = "default_broker_port")]
    pub uat_port: u16,

    /// MQTT keep-alive interval in seconds.
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,

    /// Delay before the UAT client retries after an abnormal disconnect.
    #[serde(default = "default_reconnect_delay_secs")]
    pub reconnect_delay_secs: u64,

    /// How long a request waits for its response subscription to be acknowledged.
    #[serde(default = "default_subscribe_timeout_ms")]
    pub subscribe_timeout_ms: u64,

    /// Capacity of the client's outgoing request queue.
    #[serde(default = "default_request_capacity")]
    pub request_capacity: usize,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            onboard_url: default_onboard_url(),
            onboard_port: default_broker_port(),
            onboard_username: default_onboard_credential(),
            onboard_password: default_onboard_credential(),
            uat_url: default_uat_url(),
            uat_port: default_broker_port(),
            keep_alive_secs: default_keep_alive_secs(),
            reconnect_delay_secs: default_reconnect_delay_secs(),
            subscribe_timeout_ms: default_subscribe_timeout_ms(),
            request_capacity: default_request_capacity(),
        }
    }
}

fn default_onboard_url() -> String {
    "wss://staging.rakantani.my:4000/ws".to_string()
}

fn default_uat_url() -> String {
    "wss://dev.gaiv.my:4000/ws".to_string()
}

fn default_broker_port() -> u16 {
    4000
}

fn default_onboard_credential() -> String {
    "onboard".to_string()
}

fn default_keep_alive_secs() -> u64 {
    120
}

fn default_reconnect_delay_secs() -> u64 {
    3
}

fn default_subscribe_timeout_ms() -> u64 {
    5000
}

fn default_request_capacity() -> usize {
    64
}

/// Access packet configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IdentityConfig {
    /// Passphrase the packet key is derived from. `None` means packets cannot be opened.
    #[serde(default, serialize_with = "serialize_secret")]
    pub packet_passphrase: Option<SecretString>,
}

impl IdentityConfig {
    pub fn passphrase(&self) -> Option<&str> {
        self.packet_passphrase.as_ref().map(|s| s.expose_secret())
    }
}

// Needed by figment's `Serialized::defaults` layer.
fn serialize_secret<S: Serializer>(
    value: &Option<SecretString>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(secret) => serializer.serialize_some(secret.expose_secret()),
        None => serializer.serialize_none(),
    }
}

/// Chat simulation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChatConfig {
    /// WhatsApp business number the assistant answers from.
    #[serde(default = "default_phone_number_id")]
    pub phone_number_id: String,

    /// How many history entries are replayed when a session starts.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            phone_number_id: default_phone_number_id(),
            history_limit: default_history_limit(),
        }
    }
}

fn default_phone_number_id() -> String {
    "603884736138857".to_string()
}

fn default_history_limit() -> usize {
    5
}
