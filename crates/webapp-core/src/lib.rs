// ABOUTME: Core types and constants for the webapp document-store helpers
// ABOUTME: Foundation crate with error handling, query descriptors, models, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![deny(unsafe_code)]

//! # Webapp Core
//!
//! Foundation crate providing the shared types used by the `webapp` crate.
//! It changes rarely, so the workspace recompiles little when the managers
//! evolve.
//!
//! ## Modules
//!
//! - **errors**: `AppError`, `ErrorCode` and the datastore error enum
//! - **constants**: stored field names and tuning defaults
//! - **query**: database-agnostic filter/order/limit descriptors
//! - **models**: remember-me `Token`, directory `User` and JWT `Claims`

/// Unified error handling with standard error codes
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Database-agnostic query descriptors
pub mod query;

/// Persisted records and token claims
pub mod models;
