// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules over the single database connection.

pub mod jobs;
pub mod recipients;
