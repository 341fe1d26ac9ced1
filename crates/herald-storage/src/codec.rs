// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Column encoding helpers shared by the query modules.
//!
//! Timestamps are stored as ISO-8601 millisecond UTC text, which sorts
//! lexicographically in the same order as chronologically. Enums are stored
//! as their lowercase strum tags; variables as a JSON object of strings.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::types::Type;

/// Format a timestamp for storage.
pub fn format_ts(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// The current instant, in storage format. Matches SQLite's
/// `strftime('%Y-%m-%dT%H:%M:%fZ', 'now')`.
pub fn now_ts() -> String {
    format_ts(&Utc::now())
}

fn conversion_failure(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

/// Parse a stored timestamp read from column `idx`.
pub fn parse_ts(idx: usize, raw: &str) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| conversion_failure(idx, e))
}

/// Parse an optional stored timestamp read from column `idx`.
pub fn parse_opt_ts(idx: usize, raw: Option<String>) -> Result<Option<DateTime<Utc>>, rusqlite::Error> {
    raw.map(|s| parse_ts(idx, &s)).transpose()
}

/// Parse a strum-tagged enum read from column `idx`.
pub fn parse_tag<T>(idx: usize, raw: &str) -> Result<T, rusqlite::Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    T::from_str(raw).map_err(|e| conversion_failure(idx, e))
}

/// Encode a variables map as a JSON object.
pub fn encode_vars(vars: &HashMap<String, String>) -> Result<String, rusqlite::Error> {
    serde_json::to_string(vars).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

/// Decode a variables map read from column `idx`.
pub fn decode_vars(idx: usize, raw: &str) -> Result<HashMap<String, String>, rusqlite::Error> {
    serde_json::from_str(raw).map_err(|e| conversion_failure(idx, e))
}
