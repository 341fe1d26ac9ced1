// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Herald notification engine.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a
//! single-writer concurrency model via `tokio-rusqlite`, and typed query
//! modules for recipients and notification jobs. The [`Database`] handle
//! implements the core [`herald_core::traits::JobStore`] trait.

pub mod codec;
pub mod database;
pub mod migrations;
pub mod queries;
pub mod store;

pub use database::Database;
