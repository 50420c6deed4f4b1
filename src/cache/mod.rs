// ABOUTME: Bounded cache of validated JWT claims keyed by the exact token string
// ABOUTME: Entries expire with the token, or after a default TTL when the token has no expiry
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

/// LRU implementation with expiry-aware lookups
pub mod memory;

pub use memory::{ClaimsCache, Lookup};

use std::time::Duration;

use crate::constants::cache::{
    DEFAULT_CACHE_MAX_ENTRIES, DEFAULT_CLEANUP_INTERVAL_SECS, DEFAULT_TTL_WITHOUT_EXPIRY_SECS,
};

/// Claims cache configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimsCacheConfig {
    /// Maximum number of cached tokens; least recently used entries go first
    pub max_entries: usize,
    /// Period of the background sweep of expired entries
    pub cleanup_interval: Duration,
    /// Run the background sweep (requires a Tokio runtime at construction)
    pub enable_background_cleanup: bool,
    /// Lifetime of entries whose claims carry no `exp`
    pub default_ttl: Duration,
}

impl Default for ClaimsCacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_CACHE_MAX_ENTRIES,
            cleanup_interval: Duration::from_secs(DEFAULT_CLEANUP_INTERVAL_SECS),
            enable_background_cleanup: true,
            default_ttl: Duration::from_secs(DEFAULT_TTL_WITHOUT_EXPIRY_SECS),
        }
    }
}
