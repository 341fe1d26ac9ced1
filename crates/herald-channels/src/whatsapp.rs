// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WhatsApp channel adapter over the Meta Cloud API.
//!
//! Without an access token the adapter runs in simulation mode.

use async_trait::async_trait;
use tracing::{info, warn};

use herald_config::model::WhatsappConfig;
use herald_core::error::SendError;
use herald_core::traits::ChannelAdapter;
use herald_core::types::{Channel, ProviderResponse};

use crate::classify_http_failure;
use crate::validate::{is_valid_phone, normalize_phone};

/// Meta Cloud API WhatsApp adapter with simulation fallback.
pub struct WhatsAppAdapter {
    config: WhatsappConfig,
    http: reqwest::Client,
}

impl WhatsAppAdapter {
    pub fn new(config: WhatsappConfig) -> Self {
        if config.access_token.is_none() {
            warn!("Meta Cloud API not configured; WhatsApp sends will be simulated");
        }
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    fn simulate(&self, to: &str) -> ProviderResponse {
        info!(to, "simulated WhatsApp send");
        ProviderResponse {
            message_id: Some(format!("wa-sim-{}", uuid::Uuid::new_v4())),
        }
    }
}

#[async_trait]
impl ChannelAdapter for WhatsAppAdapter {
    fn name(&self) -> &str {
        "whatsapp-meta"
    }

    fn channel(&self) -> Channel {
        Channel::Whatsapp
    }

    fn validate_contact(&self, contact: &str) -> bool {
        is_valid_phone(contact)
    }

    async fn send(
        &self,
        contact: &str,
        body: &str,
        _subject: Option<&str>,
    ) -> Result<ProviderResponse, SendError> {
        let to = normalize_phone(contact);
        let (Some(access_token), Some(phone_id)) =
            (&self.config.access_token, &self.config.phone_id)
        else {
            return Ok(self.simulate(&to));
        };

        let url = format!("{}/{}/messages", self.config.api_base_url, phone_id);
        let payload = serde_json::json!({
            "messaging_product": "whatsapp",
            "to": to,
            "type": "text",
            "text": { "body": body },
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(access_token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| SendError::transient(format!("meta request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(classify_http_failure(status, &detail));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| SendError::transient(format!("meta response unreadable: {e}")))?;
        Ok(ProviderResponse {
            message_id: payload
                .pointer("/messages/0/id")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string),
        })
    }
}
