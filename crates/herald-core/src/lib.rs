// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Herald notification engine.
//!
//! This crate provides the foundational trait definitions, error types, and
//! domain types used throughout the Herald workspace. Channel adapters, job
//! stores, and template sources all implement traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{HeraldError, ProviderErrorKind, SendError};
pub use types::{
    Channel, JobStatus, NotificationJob, NotificationTemplate, Priority, Recipient,
};

// Re-export the collaborator traits at crate root.
pub use traits::{ChannelAdapter, JobStore, TemplateSource};
