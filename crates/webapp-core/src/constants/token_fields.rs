// ABOUTME: Stored field names for remember-me token documents
// ABOUTME: These names are the wire contract with existing token collections
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

/// Owner of the token
pub const USERNAME: &str = "Username";

/// Per-device identifier, unique per username
pub const IDENTIFIER: &str = "Identifier";

/// Revocation flag
pub const REVOKED: &str = "Revoked";

/// User agent that obtained the token
pub const USER_AGENT: &str = "UserAgent";

/// Creation time in unix seconds
pub const CREATED: &str = "Created";

/// Last successful validation in unix seconds
pub const LAST_USED: &str = "LastUsed";
