// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel adapter trait for delivery provider integrations (email, SMS,
//! WhatsApp, etc.).

use async_trait::async_trait;

use crate::error::SendError;
use crate::types::{Channel, ProviderResponse};

/// Adapter for one outbound delivery channel.
///
/// The engine never branches on channel identity; everything it needs from
/// a provider goes through this capability surface, and adapters are looked
/// up from a registry keyed by [`Channel`].
#[async_trait]
pub trait ChannelAdapter: Send + Sync + 'static {
    /// Human-readable adapter name (e.g. "email-smtp").
    fn name(&self) -> &str;

    /// The channel this adapter delivers on.
    fn channel(&self) -> Channel;

    /// Whether a contact string satisfies this channel's format rule.
    ///
    /// Synchronous: format validation must not touch the network.
    fn validate_contact(&self, contact: &str) -> bool;

    /// Deliver a rendered message to a contact.
    ///
    /// `subject` is ignored by channels without a subject line. A single
    /// call represents a single provider attempt; retry layering lives in
    /// the engine, not here.
    async fn send(
        &self,
        contact: &str,
        body: &str,
        subject: Option<&str>,
    ) -> Result<ProviderResponse, SendError>;
}
