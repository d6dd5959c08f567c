// SPDX-FileCopyrightText: 2026 Rakan Tani Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./rakan.toml` > `~/.config/rakan/rakan.toml` > `/etc/rakan/rakan.toml`
//! with environment variable overrides via `RAKAN_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::RakanConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/rakan/rakan.toml` (system-wide)
/// 3. `~/.config/rakan/rakan.toml` (user XDG config)
/// 4. `./rakan.toml` (local directory)
/// 5. `RAKAN_*` environment variables
pub fn load_config() -> Result<RakanConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<RakanConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RakanConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<RakanConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RakanConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(RakanConfig::default()))
        .merge(Toml::file("/etc/rakan/rakan.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("rakan/rakan.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("rakan.toml"))
        .merge(env_provider())
}

/// Environment provider with explicit section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")`: `RAKAN_BROKER_UAT_URL`
/// must map to `broker.uat_url`, not `broker.uat.url`.
fn env_provider() -> Env {
    Env::prefixed("RAKAN_").map(|key| {
        let mapped = key
            .as_str()
            .replacen("app_", "app.", 1)
            .replacen("broker_", "broker.", 1)
            .replacen("identity_", "identity.", 1)
            .replacen("chat_", "chat.", 1);
        mapped.into()
    })
}
