// ABOUTME: Unified error handling with standard error codes for all webapp managers
// ABOUTME: Defines AppError, ErrorCode, and convenience constructors for the error taxonomy
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Unified Error Handling System
//!
//! Every manager operation reports failure as an [`AppError`] carrying an
//! [`ErrorCode`]. Callers branch on the code, never on the message:
//!
//! - duplicate keys map to [`ErrorCode::ResourceAlreadyExists`]
//! - absent (or deliberately hidden) records map to [`ErrorCode::ResourceNotFound`]
//! - rejected credentials map to [`ErrorCode::AuthInvalid`] / [`ErrorCode::AuthExpired`]
//! - store failures pass through as [`ErrorCode::DatabaseError`]
//! - malformed stored documents map to [`ErrorCode::SerializationError`]

/// Datastore-level error enum
pub mod datastore;

pub use datastore::DatastoreError;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Standard error codes used throughout the crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    // Authentication (1000-1999)
    /// Credential failed verification, or a remember-me token is not valid
    #[serde(rename = "AUTH_INVALID")]
    AuthInvalid = 1001,
    /// Credential verified but past its expiry
    #[serde(rename = "AUTH_EXPIRED")]
    AuthExpired = 1002,

    // Validation (3000-3999)
    /// Caller supplied unusable input
    #[serde(rename = "INVALID_INPUT")]
    InvalidInput = 3000,

    // Resource Management (4000-4999)
    /// Record does not exist
    #[serde(rename = "RESOURCE_NOT_FOUND")]
    ResourceNotFound = 4000,
    /// Record with the same unique key already exists
    #[serde(rename = "RESOURCE_ALREADY_EXISTS")]
    ResourceAlreadyExists = 4001,

    // Configuration (6000-6999)
    /// Generic configuration failure
    #[serde(rename = "CONFIG_ERROR")]
    ConfigError = 6000,
    /// Required configuration value is missing
    #[serde(rename = "CONFIG_MISSING")]
    ConfigMissing = 6001,
    /// Configuration value could not be parsed
    #[serde(rename = "CONFIG_INVALID")]
    ConfigInvalid = 6002,

    // Lifecycle (7000-7999)
    /// Caller cancelled the operation before it completed
    #[serde(rename = "OPERATION_CANCELLED")]
    OperationCancelled = 7000,

    // Internal Errors (9000-9999)
    /// Unexpected internal failure
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError = 9000,
    /// Underlying store or transport failure
    #[serde(rename = "DATABASE_ERROR")]
    DatabaseError = 9001,
    /// Stored document could not be decoded
    #[serde(rename = "SERIALIZATION_ERROR")]
    SerializationError = 9003,
}

impl ErrorCode {
    /// HTTP status code an HTTP layer should use for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::InvalidInput => 400,
            Self::AuthInvalid | Self::AuthExpired => 401,
            Self::ResourceNotFound => 404,
            Self::ResourceAlreadyExists => 409,
            Self::OperationCancelled => 499,
            Self::InternalError
            | Self::DatabaseError
            | Self::SerializationError
            | Self::ConfigError
            | Self::ConfigMissing
            | Self::ConfigInvalid => 500,
        }
    }

    /// User-facing description of this error
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::AuthInvalid => "The provided credentials are invalid",
            Self::AuthExpired => "The credentials have expired",
            Self::InvalidInput => "The provided input is invalid",
            Self::ResourceNotFound => "The requested resource was not found",
            Self::ResourceAlreadyExists => "A resource with this identifier already exists",
            Self::ConfigError => "Configuration error encountered",
            Self::ConfigMissing => "Required configuration is missing",
            Self::ConfigInvalid => "Configuration is invalid",
            Self::OperationCancelled => "The operation was cancelled",
            Self::InternalError => "An internal error occurred",
            Self::DatabaseError => "Database operation failed",
            Self::SerializationError => "Data serialization/deserialization failed",
        }
    }
}

/// Unified error type for the crate
#[derive(Debug, Error)]
#[error("{}: {}", .code.description(), .message)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Create a new error with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Attach a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.code.http_status()
    }

    /// Whether the error has the given code
    #[must_use]
    pub fn is(&self, code: ErrorCode) -> bool {
        self.code == code
    }
}

/// Convenience constructors for the error taxonomy
impl AppError {
    /// Invalid credential
    pub fn auth_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AuthInvalid, message)
    }

    /// Credential expired
    #[must_use]
    pub fn auth_expired() -> Self {
        Self::new(ErrorCode::AuthExpired, "Token has expired")
    }

    /// Remember-me token is absent or revoked; the two cases are reported identically
    #[must_use]
    pub fn invalid_token() -> Self {
        Self::new(ErrorCode::AuthInvalid, "Token invalid")
    }

    /// Remember-me token with the same username and identifier already exists
    #[must_use]
    pub fn duplicate_token() -> Self {
        Self::new(ErrorCode::ResourceAlreadyExists, "Token duplicate")
    }

    /// Remember-me token does not exist
    #[must_use]
    pub fn token_not_found() -> Self {
        Self::not_found("Token")
    }

    /// User with the same username, email or phone number already exists
    #[must_use]
    pub fn duplicate_user() -> Self {
        Self::new(ErrorCode::ResourceAlreadyExists, "Duplicate user")
    }

    /// User does not exist
    #[must_use]
    pub fn user_not_found() -> Self {
        Self::not_found("User")
    }

    /// Resource not found
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ResourceNotFound,
            format!("{} not found", resource.into()),
        )
    }

    /// Invalid input
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Operation cancelled by the caller
    #[must_use]
    pub fn cancelled() -> Self {
        Self::new(ErrorCode::OperationCancelled, "Operation cancelled")
    }

    /// Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// Configuration value could not be parsed
    pub fn config_invalid(key: &str, value: &str) -> Self {
        Self::new(
            ErrorCode::ConfigInvalid,
            format!("Invalid value for {key}: {value:?}"),
        )
    }
}

/// Serializable error body for HTTP layers built on top of the managers
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
}

impl From<&AppError> for ErrorResponse {
    fn from(error: &AppError) -> Self {
        Self {
            code: error.code,
            message: error.message.clone(),
        }
    }
}

impl From<DatastoreError> for AppError {
    fn from(error: DatastoreError) -> Self {
        let code = match &error {
            DatastoreError::Decode { .. } => ErrorCode::SerializationError,
            DatastoreError::AlreadyExists(_) => ErrorCode::ResourceAlreadyExists,
            DatastoreError::InvalidQuery(_) => ErrorCode::InvalidInput,
            DatastoreError::Cancelled => ErrorCode::OperationCancelled,
            DatastoreError::Transport(_)
            | DatastoreError::ReadAfterWrite
            | DatastoreError::TransactionClosed => ErrorCode::DatabaseError,
        };
        Self::new(code, error.to_string()).with_source(error)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::new(ErrorCode::SerializationError, error.to_string()).with_source(error)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_http_status() {
        assert_eq!(ErrorCode::AuthInvalid.http_status(), 401);
        assert_eq!(ErrorCode::ResourceAlreadyExists.http_status(), 409);
        assert_eq!(ErrorCode::ResourceNotFound.http_status(), 404);
        assert_eq!(ErrorCode::DatabaseError.http_status(), 500);
    }

    #[test]
    fn test_taxonomy_constructors() {
        assert!(AppError::duplicate_token().is(ErrorCode::ResourceAlreadyExists));
        assert!(AppError::duplicate_user().is(ErrorCode::ResourceAlreadyExists));
        assert!(AppError::invalid_token().is(ErrorCode::AuthInvalid));
        assert!(AppError::token_not_found().is(ErrorCode::ResourceNotFound));
        assert!(AppError::user_not_found().is(ErrorCode::ResourceNotFound));
        assert!(AppError::auth_expired().is(ErrorCode::AuthExpired));
    }

    #[test]
    fn test_datastore_error_conversion() {
        let decode: AppError = DatastoreError::Decode {
            document: "users/abc".to_owned(),
            reason: "missing field".to_owned(),
        }
        .into();
        assert_eq!(decode.code, ErrorCode::SerializationError);
        assert!(decode.message.contains("users/abc"));

        let transport: AppError = DatastoreError::Transport("connection reset".to_owned()).into();
        assert_eq!(transport.code, ErrorCode::DatabaseError);
        assert!(std::error::Error::source(&transport).is_some());
    }

    #[test]
    fn test_error_response_serialization() {
        let error = AppError::duplicate_user();
        let response = ErrorResponse::from(&error);
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("RESOURCE_ALREADY_EXISTS"));
        assert!(json.contains("Duplicate user"));
    }
}
