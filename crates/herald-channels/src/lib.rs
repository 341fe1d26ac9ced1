// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Concrete channel adapters for the Herald notification engine.
//!
//! Each adapter implements [`herald_core::traits::ChannelAdapter`] for one
//! delivery medium and falls back to simulation when its provider
//! credentials are absent, so unconfigured environments still exercise the
//! full dispatch path.

pub mod email;
pub mod sms;
pub mod validate;
pub mod whatsapp;

pub use email::EmailAdapter;
pub use sms::SmsAdapter;
pub use whatsapp::WhatsAppAdapter;

use herald_core::error::SendError;

/// Map a non-success provider HTTP status onto the retry taxonomy:
/// server errors and throttling are worth an immediate retry, everything
/// else is permanent.
pub(crate) fn classify_http_failure(status: reqwest::StatusCode, detail: &str) -> SendError {
    let message = format!("provider returned {status}: {detail}");
    if status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        SendError::transient(message)
    } else {
        SendError::permanent(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn server_errors_and_throttling_are_transient() {
        assert!(classify_http_failure(StatusCode::INTERNAL_SERVER_ERROR, "").is_transient());
        assert!(classify_http_failure(StatusCode::SERVICE_UNAVAILABLE, "").is_transient());
        assert!(classify_http_failure(StatusCode::TOO_MANY_REQUESTS, "").is_transient());
    }

    #[test]
    fn client_errors_are_permanent() {
        assert!(!classify_http_failure(StatusCode::BAD_REQUEST, "").is_transient());
        assert!(!classify_http_failure(StatusCode::UNAUTHORIZED, "").is_transient());
        assert!(!classify_http_failure(StatusCode::NOT_FOUND, "").is_transient());
    }
}
