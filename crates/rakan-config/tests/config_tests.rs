// SPDX-FileCopyrightText: 2026 Rakan Tani Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the configuration system.

use std::io::Write;

use rakan_config::diagnostic::ConfigError;
use rakan_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};
use serial_test::serial;

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_rakan_config() {
    let toml = r#"
[app]
log_level = "debug"

[broker]
onboard_url = "ws://localhost:9001/ws"
onboard_port = 9001
onboard_username = "farm"
onboard_password = "secret"
uat_url = "wss://uat.example.my:4000/ws"
uat_port = 4000
keep_alive_secs = 60
reconnect_delay_secs = 5
subscribe_timeout_ms = 250
request_capacity = 16

[identity]
packet_passphrase = "open sesame"

[chat]
phone_number_id = "600000000000"
history_limit = 3
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.app.log_level, "debug");
    assert_eq!(config.broker.onboard_url, "ws://localhost:9001/ws");
    assert_eq!(config.broker.onboard_port, 9001);
    assert_eq!(config.broker.onboard_username, "farm");
    assert_eq!(config.broker.keep_alive_secs, 60);
    assert_eq!(config.broker.reconnect_delay_secs, 5);
    assert_eq!(config.broker.subscribe_timeout_ms, 250);
    assert_eq!(config.broker.request_capacity, 16);
    assert_eq!(config.identity.passphrase(), Some("open sesame"));
    assert_eq!(config.chat.phone_number_id, "600000000000");
    assert_eq!(config.chat.history_limit, 3);
}

#[test]
fn empty_toml_uses_defaults() {
    let config = load_and_validate_str("").expect("defaults should validate");
    assert_eq!(config.app.log_level, "info");
    assert_eq!(config.broker.uat_url, "wss://dev.gaiv.my:4000/ws");
    assert_eq!(config.broker.keep_alive_secs, 120);
    assert_eq!(config.broker.reconnect_delay_secs, 3);
    assert_eq!(config.chat.phone_number_id, "603884736138857");
    assert_eq!(config.chat.history_limit, 5);
    assert!(config.identity.passphrase().is_none());
}

#[test]
fn unknown_field_produces_suggestion() {
    let toml = r#"
[broker]
uat_ulr = "wss://x/ws"
"#;
    let errors = load_and_validate_str(toml).unwrap_err();
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } => {
            assert_eq!(key, "uat_ulr");
            assert_eq!(suggestion.as_deref(), Some("uat_url"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

#[test]
fn unknown_section_is_rejected() {
    let errors = load_and_validate_str("[telegram]\nbot_token = \"x\"\n").unwrap_err();
    assert!(matches!(errors[0], ConfigError::UnknownKey { .. }));
}

#[test]
fn wrong_type_produces_invalid_type() {
    let errors = load_and_validate_str("[chat]\nhistory_limit = \"five\"\n").unwrap_err();
    assert!(matches!(errors[0], ConfigError::InvalidType { .. }));
}

#[test]
fn validation_errors_surface_through_load() {
    let errors = load_and_validate_str("[broker]\nkeep_alive_secs = 1\n").unwrap_err();
    assert!(matches!(errors[0], ConfigError::Validation { .. }));
}

#[test]
#[serial]
fn env_overrides_file_values() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[chat]\nhistory_limit = 2\n[broker]\nuat_port = 4000").unwrap();

    // SAFETY: serialized with other env-touching tests.
    unsafe {
        std::env::set_var("RAKAN_BROKER_UAT_PORT", "4443");
        std::env::set_var("RAKAN_IDENTITY_PACKET_PASSPHRASE", "from-env");
    }
    let result = load_and_validate_path(file.path());
    unsafe {
        std::env::remove_var("RAKAN_BROKER_UAT_PORT");
        std::env::remove_var("RAKAN_IDENTITY_PACKET_PASSPHRASE");
    }

    let config = result.expect("config should load");
    assert_eq!(config.chat.history_limit, 2);
    assert_eq!(config.broker.uat_port, 4443);
    assert_eq!(config.identity.passphrase(), Some("from-env"));
}
