// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Herald workspace.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Default number of durable retry slots a job receives at creation.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// A delivery medium.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Email,
    Sms,
    Whatsapp,
}

impl Channel {
    /// Every channel Herald knows about, in a stable order.
    pub const ALL: [Channel; 3] = [Channel::Email, Channel::Sms, Channel::Whatsapp];
}

/// Lifecycle state of a notification job.
///
/// The happy path is `pending -> queued -> sent -> delivered`. `failed` and
/// `cancelled` are alternate terminals reachable from `pending`/`queued`.
/// The single sanctioned back-edge is `queued -> pending`, used for durable
/// retry after a failed dispatch attempt.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Queued,
    Sent,
    Delivered,
    Failed,
    Cancelled,
}

impl JobStatus {
    /// Terminal states admit no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobStatus::Delivered | JobStatus::Failed | JobStatus::Cancelled
        )
    }

    /// Whether the state machine permits moving from `self` to `next`.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        use JobStatus::*;
        matches!(
            (self, next),
            (Pending, Queued)
                | (Pending, Failed)
                | (Pending, Cancelled)
                | (Queued, Sent)
                | (Queued, Pending)
                | (Queued, Failed)
                | (Queued, Cancelled)
                | (Sent, Delivered)
        )
    }
}

/// Scheduling weight used as the primary sort key when selecting due jobs.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
}

impl Priority {
    /// Sort rank: lower value dispatches first.
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Normal => 1,
            Priority::Low => 2,
        }
    }
}

/// Category of a notification template.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    OrderConfirmation,
    DeliveryUpdate,
    AbandonedCart,
    Newsletter,
    Promo,
    PasswordReset,
    PaymentReceipt,
    Custom,
}

/// A placeholder variable a template declares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateVariable {
    pub name: String,
    pub description: String,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

impl TemplateVariable {
    pub fn required(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            required: true,
            default_value: None,
        }
    }

    pub fn optional(name: &str, description: &str, default_value: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            required: false,
            default_value: default_value.map(str::to_string),
        }
    }
}

/// A stored message template for one channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationTemplate {
    pub id: String,
    pub name: String,
    pub kind: TemplateKind,
    pub channel: Channel,
    /// Only meaningful for channels with a subject line (email).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub body: String,
    pub variables: Vec<TemplateVariable>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-channel consent flags.
///
/// Each flag is tri-state: `Some(true)` / `Some(false)` are explicit
/// preferences, `None` means no preference was ever recorded. How `None`
/// is interpreted is an opt-in gate policy decision, not fixed here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptIns {
    #[serde(default)]
    pub email: Option<bool>,
    #[serde(default)]
    pub sms: Option<bool>,
    #[serde(default)]
    pub whatsapp: Option<bool>,
}

impl OptIns {
    /// All channels explicitly opted in.
    pub fn all_opted_in() -> Self {
        Self {
            email: Some(true),
            sms: Some(true),
            whatsapp: Some(true),
        }
    }

    pub fn flag(&self, channel: Channel) -> Option<bool> {
        match channel {
            Channel::Email => self.email,
            Channel::Sms => self.sms,
            Channel::Whatsapp => self.whatsapp,
        }
    }

    pub fn set(&mut self, channel: Channel, opted_in: bool) {
        match channel {
            Channel::Email => self.email = Some(opted_in),
            Channel::Sms => self.sms = Some(opted_in),
            Channel::Whatsapp => self.whatsapp = Some(opted_in),
        }
    }
}

/// A partial opt-in update; `None` fields are left untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptInUpdate {
    pub email: Option<bool>,
    pub sms: Option<bool>,
    pub whatsapp: Option<bool>,
}

/// Someone messages can be dispatched to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipient {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whatsapp_number: Option<String>,
    #[serde(default)]
    pub opt_ins: OptIns,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Recipient {
    /// The raw stored contact for a channel, ignoring opt-in state.
    pub fn contact(&self, channel: Channel) -> Option<&str> {
        let value = match channel {
            Channel::Email => self.email.as_deref(),
            Channel::Sms => self.phone.as_deref(),
            Channel::Whatsapp => self.whatsapp_number.as_deref(),
        };
        value.filter(|v| !v.is_empty())
    }
}

/// One queued unit of work: send one rendered template to one recipient
/// over one channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationJob {
    pub id: String,
    pub template_id: String,
    pub channel: Channel,
    pub recipient_id: String,
    /// Captured at creation time and never re-resolved.
    pub recipient_contact: String,
    pub status: JobStatus,
    pub variables: HashMap<String, String>,
    pub scheduled_for: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub retry_count: u32,
    pub max_retries: u32,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A request to send one logical notification over one or more channels.
#[derive(Debug, Clone)]
pub struct SendRequest {
    pub template_id: String,
    pub channels: Vec<Channel>,
    pub recipient: Recipient,
    pub variables: HashMap<String, String>,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub priority: Priority,
}

/// A fan-out request across many recipients, with optional per-recipient
/// variable overrides layered over the common variables.
#[derive(Debug, Clone)]
pub struct BulkSendRequest {
    pub template_id: String,
    pub channels: Vec<Channel>,
    pub recipients: Vec<Recipient>,
    pub variables: HashMap<String, String>,
    pub recipient_variables: HashMap<String, HashMap<String, String>>,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub priority: Priority,
}

/// Why a (recipient, channel) pair was skipped at request time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    /// The recipient has not consented to this channel.
    OptInDenied,
    /// The recipient has consented but no contact is on file.
    MissingContact,
    /// The referenced template does not target this channel.
    UnsupportedChannel { template_id: String },
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectionReason::OptInDenied => write!(f, "recipient has not opted in"),
            RejectionReason::MissingContact => write!(f, "no contact on file"),
            RejectionReason::UnsupportedChannel { template_id } => {
                write!(f, "template {template_id} does not support this channel")
            }
        }
    }
}

/// One per-channel denial inside a partial-success send result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRejection {
    pub recipient_id: String,
    pub channel: Channel,
    pub reason: RejectionReason,
}

/// Outcome of a send request: jobs created plus per-channel rejections.
///
/// Denied channels never abort their siblings, so both lists can be
/// non-empty at once.
#[derive(Debug, Clone, Default)]
pub struct SendReceipt {
    pub job_ids: Vec<String>,
    pub rejections: Vec<ChannelRejection>,
}

impl SendReceipt {
    /// A request succeeded if at least one job was created.
    pub fn success(&self) -> bool {
        !self.job_ids.is_empty()
    }

    /// Fold another receipt into this one (bulk fan-out).
    pub fn merge(&mut self, other: SendReceipt) {
        self.job_ids.extend(other.job_ids);
        self.rejections.extend(other.rejections);
    }
}

/// Successful provider acknowledgement of a send.
#[derive(Debug, Clone, Default)]
pub struct ProviderResponse {
    pub message_id: Option<String>,
}

/// Filter over persisted job history.
#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    pub channel: Option<Channel>,
    pub status: Option<JobStatus>,
    pub template_id: Option<String>,
    pub recipient_id: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

/// Timestamp/error fields that may accompany a status update.
#[derive(Debug, Clone, Default)]
pub struct JobStatusUpdate {
    pub sent_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub failed_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
    pub retry_count: Option<u32>,
}

/// Per-channel dispatch counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelCounts {
    pub sent: u64,
    pub delivered: u64,
    pub failed: u64,
}

/// Raw opt-in tallies over the recipient set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptInCounts {
    pub total_recipients: u64,
    pub email: u64,
    pub sms: u64,
    pub whatsapp: u64,
}

/// Fraction of recipients with an explicit opt-in per channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OptInRatios {
    pub email: f64,
    pub sms: f64,
    pub whatsapp: f64,
}

/// Derived, never persisted: aggregate view over the filtered job set.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalyticsSummary {
    pub total_sent: u64,
    pub total_delivered: u64,
    pub total_failed: u64,
    pub by_channel: HashMap<Channel, ChannelCounts>,
    pub by_status: HashMap<JobStatus, u64>,
    pub opt_in_ratios: OptInRatios,
}
