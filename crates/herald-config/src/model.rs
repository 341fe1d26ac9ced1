// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Herald notification engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Herald configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HeraldConfig {
    /// Service identity and logging settings.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Opt-in gate policy settings.
    #[serde(default)]
    pub optin: OptInConfig,

    /// Durable and transient retry settings.
    #[serde(default)]
    pub retry: RetryConfig,

    /// Periodic scheduler settings.
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Optimistic delivery confirmation settings.
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Email (SMTP) channel settings.
    #[serde(default)]
    pub email: EmailConfig,

    /// SMS (Twilio) channel settings.
    #[serde(default)]
    pub sms: SmsConfig,

    /// WhatsApp (Meta Cloud API) channel settings.
    #[serde(default)]
    pub whatsapp: WhatsappConfig,
}

/// Service identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Display name of the service.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_service_name() -> String {
    "herald".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    "data/herald.db".to_string()
}

/// Opt-in gate policy configuration.
///
/// The legacy system treated a recipient with no recorded preference as
/// opted in; the newer path requires an explicit flag. Both behaviors are
/// kept selectable so operators can migrate deliberately.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OptInConfig {
    /// When true, a recipient with no recorded preference for a channel is
    /// treated as opted in (legacy behavior). Default: false.
    #[serde(default)]
    pub assume_opted_in_when_absent: bool,
}

/// Retry configuration for both retry layers.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RetryConfig {
    /// Durable retry slots per job (persisted, survives restarts).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// In-call attempts per adapter send for transient errors.
    #[serde(default = "default_transient_attempts")]
    pub transient_attempts: u32,

    /// Base backoff delay in milliseconds; doubles per transient attempt.
    #[serde(default = "default_transient_base_ms")]
    pub transient_base_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            transient_attempts: default_transient_attempts(),
            transient_base_ms: default_transient_base_ms(),
        }
    }
}

fn default_max_retries() -> u32 {
    3
}

fn default_transient_attempts() -> u32 {
    3
}

fn default_transient_base_ms() -> u64 {
    1000
}

/// Periodic scheduler configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SchedulerConfig {
    /// Seconds between periodic ticks.
    #[serde(default = "default_tick_interval_secs")]
    pub tick_interval_secs: u64,

    /// Maximum jobs selected per tick.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Pause between jobs within a tick, in milliseconds. Keeps burst rate
    /// under provider limits.
    #[serde(default = "default_inter_job_pause_ms")]
    pub inter_job_pause_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: default_tick_interval_secs(),
            batch_size: default_batch_size(),
            inter_job_pause_ms: default_inter_job_pause_ms(),
        }
    }
}

fn default_tick_interval_secs() -> u64 {
    60
}

fn default_batch_size() -> usize {
    50
}

fn default_inter_job_pause_ms() -> u64 {
    100
}

/// Optimistic delivery confirmation configuration.
///
/// Where no delivery-receipt channel exists, `sent` jobs older than the
/// grace period may be promoted to `delivered`. Observability-only; never
/// blocks dispatch.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DeliveryConfig {
    /// Enable the optimistic `sent -> delivered` promotion pass.
    #[serde(default = "default_optimistic")]
    pub optimistic: bool,

    /// Seconds a job must have been `sent` before promotion.
    #[serde(default = "default_grace_secs")]
    pub grace_secs: u64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            optimistic: default_optimistic(),
            grace_secs: default_grace_secs(),
        }
    }
}

fn default_optimistic() -> bool {
    true
}

fn default_grace_secs() -> u64 {
    60
}

/// Email channel configuration. Without SMTP credentials the adapter
/// simulates sends.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EmailConfig {
    /// From address for outbound mail.
    #[serde(default = "default_email_from")]
    pub from: String,

    /// SMTP relay host. `None` enables simulation mode.
    #[serde(default)]
    pub smtp_host: Option<String>,

    /// SMTP relay port.
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    /// SMTP username.
    #[serde(default)]
    pub smtp_user: Option<String>,

    /// SMTP password.
    #[serde(default)]
    pub smtp_password: Option<String>,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            from: default_email_from(),
            smtp_host: None,
            smtp_port: default_smtp_port(),
            smtp_user: None,
            smtp_password: None,
        }
    }
}

fn default_email_from() -> String {
    "notifications@example.com".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

/// SMS channel configuration (Twilio). Without credentials the adapter
/// simulates sends.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SmsConfig {
    /// Twilio account SID. `None` enables simulation mode.
    #[serde(default)]
    pub account_sid: Option<String>,

    /// Twilio auth token.
    #[serde(default)]
    pub auth_token: Option<String>,

    /// Sender phone number in E.164 form.
    #[serde(default)]
    pub from_number: Option<String>,
}

/// WhatsApp channel configuration (Meta Cloud API). Without credentials the
/// adapter simulates sends.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WhatsappConfig {
    /// Meta Graph API access token. `None` enables simulation mode.
    #[serde(default)]
    pub access_token: Option<String>,

    /// WhatsApp Business phone number id.
    #[serde(default)]
    pub phone_id: Option<String>,

    /// Graph API base URL; overridable for tests.
    #[serde(default = "default_graph_base_url")]
    pub api_base_url: String,
}

impl Default for WhatsappConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            phone_id: None,
            api_base_url: default_graph_base_url(),
        }
    }
}

fn default_graph_base_url() -> String {
    "https://graph.facebook.com/v18.0".to_string()
}
