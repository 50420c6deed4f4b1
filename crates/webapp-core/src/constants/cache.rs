// ABOUTME: Validated-token cache constants for capacity, TTL, and cleanup intervals
// ABOUTME: Used by the JWT manager's in-memory LRU cache
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

/// Default maximum number of validated tokens kept in memory
pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 10_000;

/// Default cleanup interval in seconds for expired entries
pub const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 300; // 5 minutes

/// TTL for claims without an `exp` claim (1 hour)
pub const DEFAULT_TTL_WITHOUT_EXPIRY_SECS: u64 = 3_600;
