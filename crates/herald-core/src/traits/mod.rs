// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait definitions for Herald's external collaborators.

pub mod channel;
pub mod store;
pub mod template;

pub use channel::ChannelAdapter;
pub use store::JobStore;
pub use template::TemplateSource;
