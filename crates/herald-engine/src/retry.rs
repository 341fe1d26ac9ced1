// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Immediate (in-call) retry for transient provider errors.
//!
//! This is the first of two retry layers: short-lived blips are absorbed
//! here with bounded exponential backoff so they never consume a durable
//! retry slot or wait for the next scheduler cycle. Systemic failures fall
//! through to the orchestrator's persisted pending/queued retry cycle.

use std::time::Duration;

use herald_core::error::SendError;
use herald_core::traits::ChannelAdapter;
use herald_core::types::ProviderResponse;
use tracing::debug;

/// Bounds for the immediate retry layer.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total in-call attempts (including the first). Clamped to at least 1.
    pub transient_attempts: u32,
    /// Backoff before the second attempt; doubles each attempt after.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            transient_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// A policy with no immediate retries at all.
    pub fn none() -> Self {
        Self {
            transient_attempts: 1,
            base_delay: Duration::ZERO,
        }
    }

    /// Backoff after the `attempt`-th failure (1-based): base, 2x, 4x, ...
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}

/// Call `adapter.send`, retrying transient failures per `policy`.
///
/// Permanent failures return immediately; the last transient failure is
/// returned once attempts are exhausted.
pub async fn send_with_retry(
    adapter: &dyn ChannelAdapter,
    contact: &str,
    body: &str,
    subject: Option<&str>,
    policy: &RetryPolicy,
) -> Result<ProviderResponse, SendError> {
    let attempts = policy.transient_attempts.max(1);
    let mut attempt = 1;
    loop {
        match adapter.send(contact, body, subject).await {
            Ok(response) => return Ok(response),
            Err(err) if err.is_transient() && attempt < attempts => {
                let delay = policy.delay_after(attempt);
                debug!(
                    adapter = adapter.name(),
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "transient send failure, backing off"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
