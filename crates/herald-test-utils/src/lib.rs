// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Herald integration tests.
//!
//! Provides a scriptable [`MockChannel`] adapter, a HashMap-backed
//! [`MemoryStore`], and fixture builders shared across crates.

pub mod fixtures;
pub mod memory_store;
pub mod mock_channel;

pub use memory_store::MemoryStore;
pub use mock_channel::{MockChannel, SentMessage};
