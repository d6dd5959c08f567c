// SPDX-FileCopyrightText: 2026 Rakan Tani Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as broker URL schemes and keep-alive bounds.

use crate::diagnostic::ConfigError;
use crate::model::RakanConfig;

/// Shortest keep-alive the MQTT client accepts.
pub const MIN_KEEP_ALIVE_SECS: u64 = 5;

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every error rather than failing fast.
pub fn validate_config(config: &RakanConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let broker = &config.broker;

    for (key, value) in [
        ("broker.onboard_url", &broker.onboard_url),
        ("broker.uat_url", &broker.uat_url),
    ] {
        if let Some(message) = check_ws_url(key, value) {
            errors.push(ConfigError::Validation { message });
        }
    }

    for (key, port) in [
        ("broker.onboard_port", broker.onboard_port),
        ("broker.uat_port", broker.uat_port),
    ] {
        if port == 0 {
            errors.push(ConfigError::Validation {
                message: format!("{key} must be non-zero"),
            });
        }
    }

    if broker.keep_alive_secs < MIN_KEEP_ALIVE_SECS {
        errors.push(ConfigError::Validation {
            message: format!(
                "broker.keep_alive_secs must be at least {MIN_KEEP_ALIVE_SECS}, got {}",
                broker.keep_alive_secs
            ),
        });
    }

    if broker.request_capacity == 0 {
        errors.push(ConfigError::Validation {
            message: "broker.request_capacity must be at least 1".to_string(),
        });
    }

    if config.chat.history_limit == 0 {
        errors.push(ConfigError::Validation {
            message: "chat.history_limit must be at least 1".to_string(),
        });
    }

    if config.chat.phone_number_id.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "chat.phone_number_id must not be empty".to_string(),
        });
    }

    if let Some(passphrase) = config.identity.passphrase()
        && passphrase.is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "identity.packet_passphrase must not be empty when set".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_ws_url(key: &str, value: &str) -> Option<String> {
    match url::Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "ws" | "wss") => None,
        Ok(url) => Some(format!(
            "{key} must use ws:// or wss://, got `{}://`",
            url.scheme()
        )),
        Err(e) => Some(format!("{key} `{value}` is not a valid URL: {e}")),
    }
}
