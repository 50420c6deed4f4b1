// ABOUTME: Main library entry point for the webapp document-store helpers
// ABOUTME: Provides OR queries, remember-me tokens, user directory, and PS512 JWT management
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![deny(unsafe_code)]

//! # Webapp
//!
//! Helpers for web applications backed by a Firestore-style document
//! database, which natively supports only conjunctive (AND) filters.
//!
//! ## Components
//!
//! - **datastore**: the document store seam, an in-memory backend and the
//!   OR engine that runs several queries concurrently inside one transaction
//! - **rememberme**: persistent-login token lifecycle (add, validate, revoke,
//!   delete, purge)
//! - **user**: user directory with uniqueness across username, email and
//!   phone number
//! - **jwt**: PS512 signing and verification with a validated-token cache
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use webapp::context::CancellationToken;
//! use webapp::datastore::memory::InMemoryStore;
//! use webapp::errors::AppResult;
//! use webapp::models::Token;
//! use webapp::rememberme::{DatastoreTokenManager, TokenManager};
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let store = InMemoryStore::new();
//!     let manager = DatastoreTokenManager::new(store, "rememberme_tokens");
//!     let ctx = CancellationToken::new();
//!
//!     let token = manager.add(&ctx, Token::new("alice", "laptop")).await?;
//!     manager.validate(&ctx, &token).await?;
//!     Ok(())
//! }
//! ```

/// Validated-token cache
pub mod cache;

/// Environment-based configuration
pub mod config;

/// Cancellation tokens propagated through every operation
pub mod context;

/// Document store seam, in-memory backend and OR engine
pub mod datastore;

/// Unified error handling (re-exported from `webapp-core`)
pub mod errors;

/// PS512 JWT signing and verification
pub mod jwt;

/// Structured logging setup
pub mod logging;

/// Remember-me token management
pub mod rememberme;

/// User directory management
pub mod user;

pub use webapp_core::constants;
pub use webapp_core::models;
pub use webapp_core::query;
