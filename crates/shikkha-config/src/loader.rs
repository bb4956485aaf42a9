// SPDX-FileCopyrightText: 2026 Shikkha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./shikkha.toml` > `~/.config/shikkha/shikkha.toml`
//! > `/etc/shikkha/shikkha.toml` with environment variable overrides via
//! `SHIKKHA_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::ShikkhaConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/shikkha/shikkha.toml` (system-wide)
/// 3. `~/.config/shikkha/shikkha.toml` (user XDG config)
/// 4. `./shikkha.toml` (local directory)
/// 5. `SHIKKHA_*` environment variables
pub fn load_config() -> Result<ShikkhaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ShikkhaConfig::default()))
        .merge(Toml::file("/etc/shikkha/shikkha.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("shikkha/shikkha.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("shikkha.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<ShikkhaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ShikkhaConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ShikkhaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ShikkhaConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `SHIKKHA_GATEWAY_API_KEY` must map to
/// `gateway.api_key`, not `gateway.api.key`.
fn env_provider() -> Env {
    Env::prefixed("SHIKKHA_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: SHIKKHA_GATEWAY_API_KEY -> "gateway_api_key"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("app_", "app.", 1)
            .replacen("gateway_", "gateway.", 1)
            .replacen("billing_", "billing.", 1)
            .replacen("dispatch_", "dispatch.", 1)
            .replacen("scheduler_", "scheduler.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("ai_", "ai.", 1);
        mapped.into()
    })
}
