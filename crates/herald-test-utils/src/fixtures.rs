// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared fixture builders for Herald tests.

use std::collections::HashMap;

use chrono::Utc;
use herald_core::types::{
    Channel, JobStatus, NotificationJob, NotificationTemplate, OptIns, Priority, Recipient,
    TemplateKind, TemplateVariable, DEFAULT_MAX_RETRIES,
};

/// A pending job, due now, for the given channel.
pub fn job(id: &str, channel: Channel) -> NotificationJob {
    let now = Utc::now();
    NotificationJob {
        id: id.to_string(),
        template_id: "greeting".into(),
        channel,
        recipient_id: "r1".into(),
        recipient_contact: match channel {
            Channel::Email => "ana@example.com".into(),
            Channel::Sms | Channel::Whatsapp => "15551234567".into(),
        },
        status: JobStatus::Pending,
        variables: HashMap::from([("name".to_string(), "Ana".to_string())]),
        scheduled_for: now,
        sent_at: None,
        delivered_at: None,
        failed_at: None,
        error_message: None,
        retry_count: 0,
        max_retries: DEFAULT_MAX_RETRIES,
        priority: Priority::Normal,
        created_at: now,
        updated_at: now,
    }
}

/// A recipient opted in to every channel, with contacts for all three.
pub fn recipient(id: &str) -> Recipient {
    let now = Utc::now();
    Recipient {
        id: id.to_string(),
        name: "Ana Souza".into(),
        email: Some("ana@example.com".into()),
        phone: Some("15551234567".into()),
        whatsapp_number: Some("15551234567".into()),
        opt_ins: OptIns::all_opted_in(),
        created_at: now,
        updated_at: now,
    }
}

/// A single-required-variable template for the given channel
/// (`Hi {{name}}`, subject `Hello {{name}}` on email).
pub fn template(id: &str, channel: Channel) -> NotificationTemplate {
    let now = Utc::now();
    NotificationTemplate {
        id: id.to_string(),
        name: format!("Greeting ({channel})"),
        kind: TemplateKind::Custom,
        channel,
        subject: match channel {
            Channel::Email => Some("Hello {{name}}".into()),
            _ => None,
        },
        body: "Hi {{name}}".into(),
        variables: vec![TemplateVariable::required("name", "Recipient name")],
        active: true,
        created_at: now,
        updated_at: now,
    }
}
