// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Template registry and renderer for the Herald notification engine.
//!
//! Templates declare their placeholder variables; rendering substitutes
//! `{{name}}` occurrences and reports missing required variables instead of
//! failing.

pub mod builtin;
pub mod registry;
pub mod render;

pub use builtin::builtin_templates;
pub use registry::TemplateRegistry;
pub use render::{render, Rendered};
