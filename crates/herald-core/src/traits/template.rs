// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Template lookup trait.

use crate::types::NotificationTemplate;

/// Read access to stored templates.
///
/// Lookup is synchronous by contract: rendering happens inside the dispatch
/// hot path and must not suspend.
pub trait TemplateSource: Send + Sync {
    /// Fetch a template by id; `None` if unknown.
    fn get_template(&self, id: &str) -> Option<NotificationTemplate>;
}
