// ABOUTME: Environment-driven settings for collections, the OR engine and the claims cache
// ABOUTME: Parses WEBAPP_* variables with typed defaults and reports malformed values
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Environment-based configuration

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cache::ClaimsCacheConfig;
use crate::constants::cache::{
    DEFAULT_CACHE_MAX_ENTRIES, DEFAULT_CLEANUP_INTERVAL_SECS, DEFAULT_TTL_WITHOUT_EXPIRY_SECS,
};
use crate::constants::{
    DEFAULT_OR_BUFFER_SIZE, DEFAULT_OR_CONCURRENCY, DEFAULT_TOKEN_COLLECTION,
    DEFAULT_USER_COLLECTION,
};
use crate::datastore::OrOptions;
use crate::errors::{AppError, AppResult};

/// Variable names read by [`WebappConfig::from_env`]
pub mod keys {
    /// Collection holding remember-me tokens
    pub const TOKEN_COLLECTION: &str = "WEBAPP_TOKEN_COLLECTION";
    /// Collection holding users
    pub const USER_COLLECTION: &str = "WEBAPP_USER_COLLECTION";
    /// Maximum concurrent OR sub-queries
    pub const OR_CONCURRENCY: &str = "WEBAPP_OR_CONCURRENCY";
    /// Per-worker OR channel capacity
    pub const OR_BUFFER_SIZE: &str = "WEBAPP_OR_BUFFER_SIZE";
    /// Claims cache capacity
    pub const JWT_CACHE_MAX_ENTRIES: &str = "WEBAPP_JWT_CACHE_MAX_ENTRIES";
    /// Claims cache sweep period in seconds
    pub const JWT_CACHE_CLEANUP_SECS: &str = "WEBAPP_JWT_CACHE_CLEANUP_SECS";
    /// Whether the claims cache sweeper runs
    pub const JWT_CACHE_BACKGROUND_CLEANUP: &str = "WEBAPP_JWT_CACHE_BACKGROUND_CLEANUP";
    /// PKCS#8 PEM file with the signing key
    pub const JWT_PRIVATE_KEY_PATH: &str = "WEBAPP_JWT_PRIVATE_KEY_PATH";
    /// Optional SPKI PEM file with the verification key
    pub const JWT_PUBLIC_KEY_PATH: &str = "WEBAPP_JWT_PUBLIC_KEY_PATH";
}

/// Collection names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Remember-me token collection
    pub tokens: String,
    /// User collection
    pub users: String,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            tokens: DEFAULT_TOKEN_COLLECTION.to_owned(),
            users: DEFAULT_USER_COLLECTION.to_owned(),
        }
    }
}

/// OR engine tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrConfig {
    /// Maximum sub-queries in flight
    pub concurrency: usize,
    /// Results each worker may buffer ahead of the consumer
    pub buffer_size: usize,
}

impl Default for OrConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_OR_CONCURRENCY,
            buffer_size: DEFAULT_OR_BUFFER_SIZE,
        }
    }
}

/// JWT key locations and claims cache settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Claims cache capacity
    pub cache_max_entries: usize,
    /// Claims cache sweep period in seconds
    pub cache_cleanup_secs: u64,
    /// Run the background sweeper
    pub cache_background_cleanup: bool,
    /// Signing key file, when keys are loaded from disk
    pub private_key_path: Option<PathBuf>,
    /// Verification key file, checked against the signing key when set
    pub public_key_path: Option<PathBuf>,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            cache_max_entries: DEFAULT_CACHE_MAX_ENTRIES,
            cache_cleanup_secs: DEFAULT_CLEANUP_INTERVAL_SECS,
            cache_background_cleanup: true,
            private_key_path: None,
            public_key_path: None,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebappConfig {
    /// Collection names
    pub collections: CollectionConfig,
    /// OR engine tuning
    pub or: OrConfig,
    /// JWT settings
    pub jwt: JwtConfig,
}

impl WebappConfig {
    /// Load configuration from `WEBAPP_*` environment variables
    ///
    /// Unset variables fall back to their defaults.
    ///
    /// # Errors
    /// Returns `ConfigInvalid` naming the variable when a value does not parse
    pub fn from_env() -> AppResult<Self> {
        let config = Self {
            collections: CollectionConfig {
                tokens: env_var_or(keys::TOKEN_COLLECTION, DEFAULT_TOKEN_COLLECTION),
                users: env_var_or(keys::USER_COLLECTION, DEFAULT_USER_COLLECTION),
            },
            or: OrConfig {
                concurrency: parse_env_or(keys::OR_CONCURRENCY, DEFAULT_OR_CONCURRENCY)?,
                buffer_size: parse_env_or(keys::OR_BUFFER_SIZE, DEFAULT_OR_BUFFER_SIZE)?,
            },
            jwt: JwtConfig {
                cache_max_entries: parse_env_or(
                    keys::JWT_CACHE_MAX_ENTRIES,
                    DEFAULT_CACHE_MAX_ENTRIES,
                )?,
                cache_cleanup_secs: parse_env_or(
                    keys::JWT_CACHE_CLEANUP_SECS,
                    DEFAULT_CLEANUP_INTERVAL_SECS,
                )?,
                cache_background_cleanup: parse_bool_env_or(
                    keys::JWT_CACHE_BACKGROUND_CLEANUP,
                    true,
                )?,
                private_key_path: env_path(keys::JWT_PRIVATE_KEY_PATH),
                public_key_path: env_path(keys::JWT_PUBLIC_KEY_PATH),
            },
        };

        config.validate()?;
        info!(
            token_collection = %config.collections.tokens,
            user_collection = %config.collections.users,
            or_concurrency = config.or.concurrency,
            or_buffer_size = config.or.buffer_size,
            "Loaded webapp configuration"
        );
        Ok(config)
    }

    /// Check cross-field constraints
    ///
    /// # Errors
    /// Returns `ConfigError` for empty collection names or a public key without a private key
    pub fn validate(&self) -> AppResult<()> {
        if self.collections.tokens.is_empty() {
            return Err(AppError::config(format!(
                "{} must not be empty",
                keys::TOKEN_COLLECTION
            )));
        }
        if self.collections.users.is_empty() {
            return Err(AppError::config(format!(
                "{} must not be empty",
                keys::USER_COLLECTION
            )));
        }
        if self.jwt.public_key_path.is_some() && self.jwt.private_key_path.is_none() {
            return Err(AppError::config(format!(
                "{} requires {}",
                keys::JWT_PUBLIC_KEY_PATH,
                keys::JWT_PRIVATE_KEY_PATH
            )));
        }
        Ok(())
    }

    /// Options for the OR engine
    #[must_use]
    pub const fn or_options(&self) -> OrOptions {
        OrOptions::new(self.or.concurrency, self.or.buffer_size)
    }

    /// Claims cache configuration
    #[must_use]
    pub const fn cache_config(&self) -> ClaimsCacheConfig {
        ClaimsCacheConfig {
            max_entries: self.jwt.cache_max_entries,
            cleanup_interval: Duration::from_secs(self.jwt.cache_cleanup_secs),
            enable_background_cleanup: self.jwt.cache_background_cleanup,
            default_ttl: Duration::from_secs(DEFAULT_TTL_WITHOUT_EXPIRY_SECS),
        }
    }
}

fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn parse_env_or<T: FromStr>(key: &str, default: T) -> AppResult<T> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::config_invalid(key, &raw)),
        Err(_) => Ok(default),
    }
}

fn parse_bool_env_or(key: &str, default: bool) -> AppResult<bool> {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(AppError::config_invalid(key, &raw)),
        },
        Err(_) => Ok(default),
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    env::var(key)
        .ok()
        .filter(|raw| !raw.trim().is_empty())
        .map(PathBuf::from)
}
