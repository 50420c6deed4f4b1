// ABOUTME: Application constants organized by domain
// ABOUTME: Stored field names, collection defaults, and tuning values for queries and caches
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

/// Field names of stored remember-me token documents
pub mod token_fields;

/// Field names of stored user documents
pub mod user_fields;

/// Defaults for the validated-token cache
pub mod cache;

/// Default collection holding remember-me tokens
pub const DEFAULT_TOKEN_COLLECTION: &str = "rememberme_tokens";

/// Default collection holding user records
pub const DEFAULT_USER_COLLECTION: &str = "users";

/// Default number of concurrent sub-queries in an OR query
pub const DEFAULT_OR_CONCURRENCY: usize = 5;

/// Default per-worker result buffer of an OR query
pub const DEFAULT_OR_BUFFER_SIZE: usize = 5;

/// Length of generated document identifiers
pub const DOCUMENT_ID_LENGTH: usize = 20;

/// RSA key size for production signing keys
pub const RSA_KEY_SIZE: usize = 4096;

/// Signing algorithm name reported by the JWT manager
pub const JWT_ALGORITHM: &str = "PS512";

/// Service name used in structured logs
pub const SERVICE_NAME: &str = "webapp";
