// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Email channel adapter over SMTP (lettre).
//!
//! Without SMTP credentials the adapter runs in simulation mode: sends are
//! logged and acknowledged with a synthetic message id, so development
//! environments work without a relay.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{info, warn};

use herald_config::model::EmailConfig;
use herald_core::error::SendError;
use herald_core::traits::ChannelAdapter;
use herald_core::types::{Channel, ProviderResponse};
use herald_core::HeraldError;

use crate::validate::is_valid_email;

const DEFAULT_SUBJECT: &str = "Notification";

/// SMTP email adapter with simulation fallback.
pub struct EmailAdapter {
    config: EmailConfig,
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
}

impl EmailAdapter {
    /// Build the adapter; the SMTP transport is only constructed when host,
    /// user, and password are all configured.
    pub fn new(config: EmailConfig) -> Result<Self, HeraldError> {
        let transport = match (&config.smtp_host, &config.smtp_user, &config.smtp_password) {
            (Some(host), Some(user), Some(password)) => {
                let relay = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                    .map_err(|e| HeraldError::Config(format!("smtp relay {host}: {e}")))?;
                Some(
                    relay
                        .port(config.smtp_port)
                        .credentials(Credentials::new(user.clone(), password.clone()))
                        .build(),
                )
            }
            _ => {
                warn!("SMTP not configured; email sends will be simulated");
                None
            }
        };
        Ok(Self { config, transport })
    }

    fn simulate(&self, contact: &str, subject: Option<&str>) -> ProviderResponse {
        info!(
            to = contact,
            subject = subject.unwrap_or(DEFAULT_SUBJECT),
            "simulated email send"
        );
        ProviderResponse {
            message_id: Some(format!("email-sim-{}", uuid::Uuid::new_v4())),
        }
    }
}

#[async_trait]
impl ChannelAdapter for EmailAdapter {
    fn name(&self) -> &str {
        "email-smtp"
    }

    fn channel(&self) -> Channel {
        Channel::Email
    }

    fn validate_contact(&self, contact: &str) -> bool {
        is_valid_email(contact)
    }

    async fn send(
        &self,
        contact: &str,
        body: &str,
        subject: Option<&str>,
    ) -> Result<ProviderResponse, SendError> {
        let Some(transport) = &self.transport else {
            return Ok(self.simulate(contact, subject));
        };

        let from: Mailbox = self
            .config
            .from
            .parse()
            .map_err(|e| SendError::permanent(format!("invalid from address: {e}")))?;
        let to: Mailbox = contact
            .parse()
            .map_err(|e| SendError::permanent(format!("invalid to address: {e}")))?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(subject.unwrap_or(DEFAULT_SUBJECT))
            .body(body.to_string())
            .map_err(|e| SendError::permanent(format!("message build failed: {e}")))?;

        match transport.send(message).await {
            Ok(response) => Ok(ProviderResponse {
                message_id: response.message().next().map(str::to_string),
            }),
            Err(e) if e.is_transient() => Err(SendError::transient(e.to_string())),
            Err(e) if e.is_permanent() => Err(SendError::permanent(e.to_string())),
            // Connection-level failures have no SMTP status; retryable.
            Err(e) => Err(SendError::transient(e.to_string())),
        }
    }
}
