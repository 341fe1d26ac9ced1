// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Herald notification engine.

use thiserror::Error;

use crate::types::{Channel, JobStatus};

/// The primary error type used across all Herald traits and core operations.
#[derive(Debug, Error)]
pub enum HeraldError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A referenced template, recipient, or job does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// No adapter is registered for the requested channel. This is a wiring
    /// error and is fatal to the request, never retried.
    #[error("no adapter registered for channel: {channel}")]
    ChannelNotConfigured { channel: Channel },

    /// Required template variables were absent at dispatch time. Permanent.
    #[error("missing required variables: {}", missing.join(", "))]
    Render { missing: Vec<String> },

    /// The stored contact does not pass the channel's format rule. Permanent.
    #[error("invalid recipient contact: {contact}")]
    InvalidContact { contact: String },

    /// A delivery provider rejected or failed the send.
    #[error("provider error ({kind}): {message}")]
    Provider {
        kind: ProviderErrorKind,
        message: String,
    },

    /// A job status change that the state machine does not permit.
    #[error("illegal status transition: {from} -> {to}")]
    InvalidTransition { from: JobStatus, to: JobStatus },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Whether a provider failure is worth an immediate in-call retry.
///
/// Both kinds consume a durable retry slot identically; only the transient
/// kind is retried with backoff inside the adapter call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ProviderErrorKind {
    /// Network blips, timeouts, rate limiting.
    Transient,
    /// Rejected address, blocked sender, malformed payload.
    Permanent,
}

/// Failure outcome of a single channel-adapter send attempt.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct SendError {
    pub kind: ProviderErrorKind,
    pub message: String,
}

impl SendError {
    /// A failure likely to resolve on its own (network, timeout, throttling).
    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::Transient,
            message: message.into(),
        }
    }

    /// A failure that will not succeed on re-attempt with the same input.
    pub fn permanent(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::Permanent,
            message: message.into(),
        }
    }

    pub fn is_transient(&self) -> bool {
        self.kind == ProviderErrorKind::Transient
    }
}

impl From<SendError> for HeraldError {
    fn from(e: SendError) -> Self {
        HeraldError::Provider {
            kind: e.kind,
            message: e.message,
        }
    }
}
