// ABOUTME: Remember-me token management for persistent logins
// ABOUTME: Defines the TokenManager interface and re-exports the document-store implementation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Remember-Me Tokens
//!
//! A token is keyed by `(username, identifier)`. Its lifecycle is
//! `absent -> active -> revoked -> absent`, the last step happening through
//! [`TokenManager::delete`] or [`TokenManager::purge`].
//!
//! [`TokenManager::validate`] reports a revoked token and a token that never
//! existed with the same error.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::context::CancellationToken;
use crate::errors::AppResult;
use crate::models::Token;

/// Document-store backed token manager
pub mod datastore_manager;

pub use datastore_manager::DatastoreTokenManager;

/// Lifecycle operations over remember-me tokens
#[async_trait]
pub trait TokenManager: Send + Sync {
    /// Store a new token with `created` and `last_used` set to now
    ///
    /// # Errors
    /// `ResourceAlreadyExists` if the `(username, identifier)` pair is taken,
    /// revoked tokens included
    async fn add(&self, ctx: &CancellationToken, token: Token) -> AppResult<Token>;

    /// Check that the token exists and is not revoked, then record its use
    ///
    /// # Errors
    /// `AuthInvalid` if the token is unknown or revoked
    async fn validate(&self, ctx: &CancellationToken, token: &Token) -> AppResult<Token>;

    /// Mark the token revoked while keeping it stored; revoking twice succeeds
    ///
    /// # Errors
    /// `ResourceNotFound` if the token does not exist
    async fn revoke(&self, ctx: &CancellationToken, token: &Token) -> AppResult<Token>;

    /// Permanently remove the token; removing an absent token succeeds
    ///
    /// # Errors
    /// Store failures only
    async fn delete(&self, ctx: &CancellationToken, token: &Token) -> AppResult<()>;

    /// Remove every token of `username` last used at or before `cutoff`,
    /// revoked or not, returning how many were removed
    ///
    /// # Errors
    /// Store failures only
    async fn purge(
        &self,
        ctx: &CancellationToken,
        username: &str,
        cutoff: DateTime<Utc>,
    ) -> AppResult<usize>;
}
