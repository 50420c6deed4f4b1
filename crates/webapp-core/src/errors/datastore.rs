// ABOUTME: Structured error types for document-store operations
// ABOUTME: Covers transport, decode, transaction-rule, and cancellation failures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use thiserror::Error;

/// Failures raised by a document store or its transactions
#[derive(Debug, Error)]
pub enum DatastoreError {
    /// Underlying store or network failure, passed through verbatim
    #[error("transport failure: {0}")]
    Transport(String),

    /// A stored document could not be decoded into the requested type
    #[error("failed to decode document {document}: {reason}")]
    Decode {
        /// Path of the offending document
        document: String,
        /// Decoder message
        reason: String,
    },

    /// `create` targeted a document that already exists
    #[error("document {0} already exists")]
    AlreadyExists(String),

    /// A read was issued after the transaction had buffered a write
    #[error("reads must be executed before writes within a transaction")]
    ReadAfterWrite,

    /// The transaction was already committed or rolled back
    #[error("transaction is no longer active")]
    TransactionClosed,

    /// The query cannot be executed by this store
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// The caller's context was cancelled
    #[error("operation cancelled")]
    Cancelled,
}
