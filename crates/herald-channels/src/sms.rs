// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SMS channel adapter over the Twilio Messages API.
//!
//! Without account credentials the adapter runs in simulation mode.

use async_trait::async_trait;
use tracing::{info, warn};

use herald_config::model::SmsConfig;
use herald_core::error::SendError;
use herald_core::traits::ChannelAdapter;
use herald_core::types::{Channel, ProviderResponse};

use crate::classify_http_failure;
use crate::validate::{is_valid_phone, normalize_phone};

const TWILIO_API_BASE: &str = "https://api.twilio.com";

/// Twilio SMS adapter with simulation fallback.
pub struct SmsAdapter {
    config: SmsConfig,
    http: reqwest::Client,
    api_base: String,
}

impl SmsAdapter {
    pub fn new(config: SmsConfig) -> Self {
        if config.account_sid.is_none() {
            warn!("Twilio not configured; SMS sends will be simulated");
        }
        Self {
            config,
            http: reqwest::Client::new(),
            api_base: TWILIO_API_BASE.to_string(),
        }
    }

    /// Point the adapter at a different API base URL (tests).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn credentials(&self) -> Option<(String, String, String)> {
        Some((
            self.config.account_sid.clone()?,
            self.config.auth_token.clone()?,
            self.config.from_number.clone()?,
        ))
    }

    fn simulate(&self, to: &str) -> ProviderResponse {
        info!(to, "simulated SMS send");
        ProviderResponse {
            message_id: Some(format!("sms-sim-{}", uuid::Uuid::new_v4())),
        }
    }
}

#[async_trait]
impl ChannelAdapter for SmsAdapter {
    fn name(&self) -> &str {
        "sms-twilio"
    }

    fn channel(&self) -> Channel {
        Channel::Sms
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
        let to = format!("+{}", normalize_phone(contact));
        let Some((account_sid, auth_token, from_number)) = self.credentials() else {
            return Ok(self.simulate(&to));
        };

        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base, account_sid
        );
        let response = self
            .http
            .post(&url)
            .basic_auth(&account_sid, Some(&auth_token))
            .form(&[
                ("To", to.as_str()),
                ("From", from_number.as_str()),
                ("Body", body),
            ])
            .send()
            .await
            .map_err(|e| SendError::transient(format!("twilio request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(classify_http_failure(status, &detail));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| SendError::transient(format!("twilio response unreadable: {e}")))?;
        Ok(ProviderResponse {
            message_id: payload
                .get("sid")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string),
        })
    }
}
