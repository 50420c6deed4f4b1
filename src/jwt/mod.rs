// ABOUTME: JWT signing and verification with a cache of validated claims
// ABOUTME: Defines the JwtManager interface and the PS512 implementation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # JWT Management
//!
//! A manager signs [`Claims`] carrying a custom `dat` payload and parses
//! tokens back into claims. Parsed tokens are cached by their exact string
//! until they expire, so repeated parses skip signature verification.
//!
//! ```rust,no_run
//! use chrono::{Duration, Utc};
//! use webapp::cache::ClaimsCacheConfig;
//! use webapp::jwt::{JwtManager, Ps512Manager, RsaKeyPair};
//! use webapp::models::Claims;
//!
//! # async fn example() -> webapp::errors::AppResult<()> {
//! let keys = RsaKeyPair::generate()?;
//! let manager: Ps512Manager<String> = Ps512Manager::new(&keys, &ClaimsCacheConfig::default())?;
//!
//! let claims = Claims::new()
//!     .with_dat("user-123".to_owned())
//!     .with_expiry(Utc::now() + Duration::hours(1));
//! let token = manager.sign(claims).await?;
//! let parsed = manager.parse(&token).await?;
//! assert_eq!(parsed.dat.as_deref(), Some("user-123"));
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;

use crate::errors::AppResult;
use crate::models::Claims;

/// RSA key pair handling
pub mod keys;

/// RSASSA-PSS SHA-512 manager
pub mod ps512;

pub use keys::RsaKeyPair;
pub use ps512::Ps512Manager;

/// Signs and parses JWTs carrying a `dat` payload
#[async_trait]
pub trait JwtManager: Send + Sync {
    /// Type of the `dat` claim
    type Payload: Send;

    /// Name of the signing algorithm, e.g. `PS512`
    fn alg(&self) -> &'static str;

    /// Sign `claims` into a compact JWT
    ///
    /// # Errors
    /// Returns `InternalError` if signing fails
    async fn sign(&self, claims: Claims<Self::Payload>) -> AppResult<String>;

    /// Verify `token` and return its claims
    ///
    /// # Errors
    /// `AuthExpired` for an expired token, `AuthInvalid` for a bad signature,
    /// a foreign algorithm or a malformed token
    async fn parse(&self, token: &str) -> AppResult<Claims<Self::Payload>>;
}
