// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Herald notification engine.
//!
//! Layered TOML configuration via Figment with `HERALD_` environment
//! variable overrides and strict unknown-key rejection.

pub mod loader;
pub mod model;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::HeraldConfig;
