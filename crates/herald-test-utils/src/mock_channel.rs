// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock channel adapter for deterministic testing.
//!
//! `MockChannel` implements `ChannelAdapter` with scriptable send outcomes
//! and captured outbound messages for assertion in tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use herald_core::error::SendError;
use herald_core::traits::ChannelAdapter;
use herald_core::types::{Channel, ProviderResponse};

/// A message captured by [`MockChannel::send`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub contact: String,
    pub body: String,
    pub subject: Option<String>,
}

/// A mock delivery channel for testing.
///
/// Outcomes are scripted with `push_outcome`/`fail_times`; when the script
/// is empty, every send succeeds with a generated provider message id.
/// Successful and failed attempts alike are captured for assertion.
pub struct MockChannel {
    channel: Channel,
    outcomes: Arc<Mutex<VecDeque<Result<ProviderResponse, SendError>>>>,
    sent: Arc<Mutex<Vec<SentMessage>>>,
    contacts_valid: AtomicBool,
}

impl MockChannel {
    /// Create a new mock adapter for the given channel; all sends succeed.
    pub fn new(channel: Channel) -> Self {
        Self {
            channel,
            outcomes: Arc::new(Mutex::new(VecDeque::new())),
            sent: Arc::new(Mutex::new(Vec::new())),
            contacts_valid: AtomicBool::new(true),
        }
    }

    /// Script the outcome of the next unscripted send.
    pub async fn push_outcome(&self, outcome: Result<ProviderResponse, SendError>) {
        self.outcomes.lock().await.push_back(outcome);
    }

    /// Script `n` consecutive failures, then revert to always-succeed.
    pub async fn fail_times(&self, n: usize, error: SendError) {
        let mut outcomes = self.outcomes.lock().await;
        for _ in 0..n {
            outcomes.push_back(Err(error.clone()));
        }
    }

    /// Make `validate_contact` reject everything (or accept again).
    pub fn set_contacts_valid(&self, valid: bool) {
        self.contacts_valid.store(valid, Ordering::SeqCst);
    }

    /// All messages passed to `send`, including failed attempts.
    pub async fn sent_messages(&self) -> Vec<SentMessage> {
        self.sent.lock().await.clone()
    }

    /// Count of send attempts observed.
    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    /// Clear captured messages.
    pub async fn clear_sent(&self) {
        self.sent.lock().await.clear();
    }
}

#[async_trait]
impl ChannelAdapter for MockChannel {
    fn name(&self) -> &str {
        "mock-channel"
    }

    fn channel(&self) -> Channel {
        self.channel
    }

    fn validate_contact(&self, contact: &str) -> bool {
        self.contacts_valid.load(Ordering::SeqCst) && !contact.is_empty()
    }

    async fn send(
        &self,
        contact: &str,
        body: &str,
        subject: Option<&str>,
    ) -> Result<ProviderResponse, SendError> {
        self.sent.lock().await.push(SentMessage {
            contact: contact.to_string(),
            body: body.to_string(),
            subject: subject.map(str::to_string),
        });

        match self.outcomes.lock().await.pop_front() {
            Some(outcome) => outcome,
            None => Ok(ProviderResponse {
                message_id: Some(format!("mock-{}", uuid::Uuid::new_v4())),
            }),
        }
    }
}
