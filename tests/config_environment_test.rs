// ABOUTME: Unit tests for environment-driven configuration
// ABOUTME: Validates defaults, overrides, malformed values and derived settings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde_json::Value;
use serial_test::serial;
use webapp::config::{keys, WebappConfig};
use webapp::constants::{DEFAULT_TOKEN_COLLECTION, DEFAULT_USER_COLLECTION};
use webapp::context::CancellationToken;
use webapp::datastore::memory::InMemoryStore;
use webapp::datastore::OrOptions;
use webapp::errors::ErrorCode;
use webapp::jwt::Ps512Manager;
use webapp::models::{Token, User};
use webapp::rememberme::{DatastoreTokenManager, TokenManager};
use webapp::user::{DatastoreUserManager, UserManager};

const ALL_KEYS: [&str; 9] = [
    keys::TOKEN_COLLECTION,
    keys::USER_COLLECTION,
    keys::OR_CONCURRENCY,
    keys::OR_BUFFER_SIZE,
    keys::JWT_CACHE_MAX_ENTRIES,
    keys::JWT_CACHE_CLEANUP_SECS,
    keys::JWT_CACHE_BACKGROUND_CLEANUP,
    keys::JWT_PRIVATE_KEY_PATH,
    keys::JWT_PUBLIC_KEY_PATH,
];

fn clear_env() {
    for key in ALL_KEYS {
        env::remove_var(key);
    }
}

#[test]
#[serial]
fn test_defaults_when_unset() {
    clear_env();
    let config = WebappConfig::from_env().unwrap();

    assert_eq!(config, WebappConfig::default());
    assert_eq!(config.collections.tokens, DEFAULT_TOKEN_COLLECTION);
    assert_eq!(config.collections.users, DEFAULT_USER_COLLECTION);
    assert_eq!(config.or_options(), OrOptions::default());
    assert!(config.jwt.private_key_path.is_none());
}

#[test]
#[serial]
fn test_overrides_from_environment() {
    clear_env();
    env::set_var(keys::TOKEN_COLLECTION, "sessions");
    env::set_var(keys::OR_CONCURRENCY, "8");
    env::set_var(keys::OR_BUFFER_SIZE, " 0 ");
    env::set_var(keys::JWT_CACHE_MAX_ENTRIES, "500");
    env::set_var(keys::JWT_CACHE_CLEANUP_SECS, "30");
    env::set_var(keys::JWT_CACHE_BACKGROUND_CLEANUP, "off");
    env::set_var(keys::JWT_PRIVATE_KEY_PATH, "/etc/webapp/private.pem");

    let config = WebappConfig::from_env().unwrap();
    clear_env();

    assert_eq!(config.collections.tokens, "sessions");
    assert_eq!(config.collections.users, DEFAULT_USER_COLLECTION);
    assert_eq!(config.or_options(), OrOptions::new(8, 0));

    let cache = config.cache_config();
    assert_eq!(cache.max_entries, 500);
    assert_eq!(cache.cleanup_interval, Duration::from_secs(30));
    assert!(!cache.enable_background_cleanup);
    assert_eq!(
        config.jwt.private_key_path,
        Some(PathBuf::from("/etc/webapp/private.pem"))
    );
}

#[test]
#[serial]
fn test_malformed_number_is_rejected() {
    clear_env();
    env::set_var(keys::OR_CONCURRENCY, "lots");
    let err = WebappConfig::from_env().unwrap_err();
    clear_env();

    assert_eq!(err.code, ErrorCode::ConfigInvalid);
    assert!(err.message.contains(keys::OR_CONCURRENCY));
}

#[test]
#[serial]
fn test_malformed_bool_is_rejected() {
    clear_env();
    env::set_var(keys::JWT_CACHE_BACKGROUND_CLEANUP, "maybe");
    let err = WebappConfig::from_env().unwrap_err();
    clear_env();

    assert_eq!(err.code, ErrorCode::ConfigInvalid);
}

#[test]
#[serial]
fn test_public_key_requires_private_key() {
    clear_env();
    env::set_var(keys::JWT_PUBLIC_KEY_PATH, "/etc/webapp/public.pem");
    let err = WebappConfig::from_env().unwrap_err();
    clear_env();

    assert_eq!(err.code, ErrorCode::ConfigError);
}

#[test]
#[serial]
fn test_empty_collection_name_is_rejected() {
    clear_env();
    env::set_var(keys::USER_COLLECTION, "");
    let err = WebappConfig::from_env().unwrap_err();
    clear_env();

    assert_eq!(err.code, ErrorCode::ConfigError);
}

#[tokio::test]
#[serial]
async fn test_managers_follow_configured_collections() -> anyhow::Result<()> {
    clear_env();
    env::set_var(keys::TOKEN_COLLECTION, "sessions");
    env::set_var(keys::USER_COLLECTION, "members");
    let config = WebappConfig::from_env()?;
    clear_env();

    let store = InMemoryStore::new();
    let ctx = CancellationToken::new();
    DatastoreTokenManager::from_config(store.clone(), &config)
        .add(&ctx, Token::new("alice", "laptop"))
        .await?;
    DatastoreUserManager::from_config(store.clone(), &config)
        .add(&ctx, User::new().with_username("alice"))
        .await?;

    assert_eq!(store.snapshot("sessions").await.len(), 1);
    assert_eq!(store.snapshot("members").await.len(), 1);
    assert!(store.snapshot(DEFAULT_TOKEN_COLLECTION).await.is_empty());
    assert!(store.snapshot(DEFAULT_USER_COLLECTION).await.is_empty());
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_jwt_manager_reports_unreadable_key_file() {
    clear_env();
    env::set_var(keys::JWT_PRIVATE_KEY_PATH, "/nonexistent/webapp/private.pem");
    let config = WebappConfig::from_env().unwrap();
    clear_env();

    let err = Ps512Manager::<Value>::from_config(&config)
        .await
        .err()
        .expect("unreadable key file must fail");
    assert_eq!(err.code, ErrorCode::ConfigError);
}
