// SPDX-FileCopyrightText: 2026 Shikkha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Shikkha service.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Shikkha configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ShikkhaConfig {
    /// Service identity and logging settings.
    #[serde(default)]
    pub app: AppConfig,

    /// SMS gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Per-message billing settings.
    #[serde(default)]
    pub billing: BillingConfig,

    /// Bulk dispatch settings.
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Monthly result scheduler settings.
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// AI text-generation settings (question generation).
    #[serde(default)]
    pub ai: AiConfig,
}

/// Service identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Display name of the service instance.
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_app_name() -> String {
    "shikkha".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// SMS gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Gateway HTTP endpoint.
    #[serde(default = "default_gateway_url")]
    pub api_url: String,

    /// Gateway API key. `None` requires environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Approved sender id (masking or numeric).
    #[serde(default)]
    pub sender_id: Option<String>,

    /// Country calling code prepended during phone normalization.
    #[serde(default = "default_country_code")]
    pub country_code: String,

    /// Request timeout in seconds for one gateway call.
    #[serde(default = "default_gateway_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_url: default_gateway_url(),
            api_key: None,
            sender_id: None,
            country_code: default_country_code(),
            timeout_secs: default_gateway_timeout_secs(),
        }
    }
}

fn default_gateway_url() -> String {
    "http://bulksmsbd.net/api/smsapi".to_string()
}

fn default_country_code() -> String {
    "88".to_string()
}

fn default_gateway_timeout_secs() -> u64 {
    30
}

/// Per-message billing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BillingConfig {
    /// Cost of one SMS part in poisha (minor currency units).
    #[serde(default = "default_cost_per_part_poisha")]
    pub cost_per_sms_poisha: u32,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            cost_per_sms_poisha: default_cost_per_part_poisha(),
        }
    }
}

fn default_cost_per_part_poisha() -> u32 {
    39 // 0.39 BDT per part
}

/// Bulk dispatch configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DispatchConfig {
    /// Delay between consecutive sends in one bulk run, in milliseconds.
    /// Bounds load on the gateway and avoids its rate limiting.
    #[serde(default = "default_send_delay_ms")]
    pub send_delay_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            send_delay_ms: default_send_delay_ms(),
        }
    }
}

fn default_send_delay_ms() -> u64 {
    200
}

/// Monthly result scheduler configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SchedulerConfig {
    /// Enable the monthly result scheduler.
    #[serde(default = "default_scheduler_enabled")]
    pub enabled: bool,

    /// Tick interval in seconds. Each tick is a cheap check; real work
    /// only happens on month rollover.
    #[serde(default = "default_tick_interval_secs")]
    pub tick_interval_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: default_scheduler_enabled(),
            tick_interval_secs: default_tick_interval_secs(),
        }
    }
}

fn default_scheduler_enabled() -> bool {
    true
}

fn default_tick_interval_secs() -> u64 {
    3600 // hourly
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("shikkha").join("shikkha.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("shikkha.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// AI text-generation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AiConfig {
    /// Ordered API key pool. Keys are tried in eligibility order and
    /// rotated out on quota exhaustion.
    #[serde(default)]
    pub api_keys: Vec<String>,

    /// Generation endpoint base URL.
    #[serde(default = "default_ai_url")]
    pub api_url: String,

    /// Model identifier.
    #[serde(default = "default_ai_model")]
    pub model: String,

    /// Request timeout in seconds for one generation call.
    #[serde(default = "default_ai_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_keys: Vec::new(),
            api_url: default_ai_url(),
            model: default_ai_model(),
            timeout_secs: default_ai_timeout_secs(),
        }
    }
}

fn default_ai_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta/models".to_string()
}

fn default_ai_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_ai_timeout_secs() -> u64 {
    60
}
