// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides quiet logging, store fixtures, and a cached RSA key pair
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]
//! Shared test utilities for `webapp`

use std::env;
use std::sync::{Once, OnceLock};

use anyhow::Result;
use futures_util::TryStreamExt;
use tracing::Level;
use webapp::context::CancellationToken;
use webapp::datastore::memory::InMemoryStore;
use webapp::jwt::RsaKeyPair;
use webapp::models::User;
use webapp::rememberme::DatastoreTokenManager;
use webapp::user::{DatastoreUserManager, UserStream};

pub const TOKEN_COLLECTION: &str = "rememberme_tokens";
pub const USER_COLLECTION: &str = "users";

static INIT_LOGGER: Once = Once::new();
static TEST_KEYS: OnceLock<RsaKeyPair> = OnceLock::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        // TEST_LOG controls the level; default to WARN for quiet tests
        let log_level = match env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => Level::TRACE,
            Ok("DEBUG") => Level::DEBUG,
            Ok("INFO") => Level::INFO,
            _ => Level::WARN,
        };

        let _ = tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .try_init();
    });
}

/// Fresh empty store with logging initialized
pub fn create_test_store() -> InMemoryStore {
    init_test_logging();
    InMemoryStore::new()
}

/// Root cancellation token
pub fn test_ctx() -> CancellationToken {
    CancellationToken::new()
}

/// Token manager over a fresh store, returning the store for inspection
pub fn create_token_manager() -> (InMemoryStore, DatastoreTokenManager<InMemoryStore>) {
    let store = create_test_store();
    let manager = DatastoreTokenManager::new(store.clone(), TOKEN_COLLECTION);
    (store, manager)
}

/// User manager over a fresh store, returning the store for inspection
pub fn create_user_manager() -> (InMemoryStore, DatastoreUserManager<InMemoryStore>) {
    let store = create_test_store();
    let manager = DatastoreUserManager::new(store.clone(), USER_COLLECTION);
    (store, manager)
}

/// 2048-bit key pair shared by every test in the process
///
/// 4096-bit generation is too slow to repeat per test.
pub fn test_key_pair() -> Result<RsaKeyPair> {
    if let Some(keys) = TEST_KEYS.get() {
        return Ok(keys.clone());
    }
    let keys = RsaKeyPair::generate_with_key_size(2048)?;
    Ok(TEST_KEYS.get_or_init(|| keys).clone())
}

/// Drain a user stream, failing on the first error
pub async fn collect_users(stream: UserStream) -> Result<Vec<User>> {
    Ok(stream.try_collect::<Vec<User>>().await?)
}
