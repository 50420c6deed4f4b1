// ABOUTME: Remember-me token record persisted per (username, identifier)
// ABOUTME: Tracks revocation and creation/last-use timestamps in unix seconds
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! A user may hold any number of remember-me tokens, one per browser or
//! device, each told apart by its identifier. Clients should reuse the token
//! they already hold rather than requesting a new one.
//!
//! Lifecycle per (username, identifier):
//! absent -> active -> revoked -> absent (after delete or purge).
//! A revoked token never becomes active again.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored remember-me token
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Token {
    /// Owner of the token
    pub username: String,
    /// Per-device identifier
    pub identifier: String,
    /// Whether the token has been revoked
    #[serde(default)]
    pub revoked: bool,
    /// User agent that obtained the token
    #[serde(default)]
    pub user_agent: String,
    /// Creation time in unix seconds
    #[serde(default)]
    pub created: i64,
    /// Last successful validation in unix seconds
    #[serde(default)]
    pub last_used: i64,
}

impl Token {
    /// Create a token key for the given user and device identifier
    pub fn new(username: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            identifier: identifier.into(),
            ..Self::default()
        }
    }

    /// Set the user agent
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Creation time
    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.created, 0)
    }

    /// Last validation time
    #[must_use]
    pub fn last_used_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.last_used, 0)
    }
}
