// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contact-format rules shared by the channel adapters.

use std::sync::LazyLock;

use regex::Regex;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"));

/// Basic email shape check: local@domain.tld with no whitespace.
pub fn is_valid_email(contact: &str) -> bool {
    EMAIL_RE.is_match(contact)
}

/// Strip everything but digits from a phone number.
pub fn normalize_phone(contact: &str) -> String {
    contact.chars().filter(char::is_ascii_digit).collect()
}

/// Phone numbers are 10 to 15 digits once normalized.
pub fn is_valid_phone(contact: &str) -> bool {
    let digits = normalize_phone(contact);
    (10..=15).contains(&digits.len())
}
