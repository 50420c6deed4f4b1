// ABOUTME: PS512 (RSASSA-PSS with SHA-512) JWT manager backed by jsonwebtoken
// ABOUTME: Runs RSA work on the blocking pool and caches validated claims until expiry
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{
    decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::task;
use tracing::{debug, warn};

use super::{JwtManager, RsaKeyPair};
use crate::cache::{ClaimsCache, ClaimsCacheConfig, Lookup};
use crate::config::WebappConfig;
use crate::constants::JWT_ALGORITHM;
use crate::errors::{AppError, AppResult};
use crate::models::Claims;

/// JWT manager signing with PS512
///
/// The cache is owned by the manager; share the manager behind an `Arc` to
/// share the cache.
pub struct Ps512Manager<D = Value> {
    encoding_key: Arc<EncodingKey>,
    decoding_key: Arc<DecodingKey>,
    validation: Arc<Validation>,
    cache: ClaimsCache<D>,
}

impl<D> Ps512Manager<D>
where
    D: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Create a manager from a key pair
    ///
    /// # Errors
    /// Returns an error if the keys cannot be converted for jsonwebtoken
    pub fn new(keys: &RsaKeyPair, cache_config: &ClaimsCacheConfig) -> AppResult<Self> {
        Ok(Self::from_keys(
            keys.encoding_key()?,
            keys.decoding_key()?,
            cache_config,
        ))
    }

    /// Create a manager from PEM strings
    ///
    /// # Errors
    /// Returns `InvalidInput` if either PEM cannot be parsed as an RSA key
    pub fn from_pem(
        private_key_pem: &str,
        public_key_pem: &str,
        cache_config: &ClaimsCacheConfig,
    ) -> AppResult<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())
            .map_err(|e| AppError::invalid_input(format!("Invalid RSA private key PEM: {e}")))?;
        let decoding_key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
            .map_err(|e| AppError::invalid_input(format!("Invalid RSA public key PEM: {e}")))?;
        Ok(Self::from_keys(encoding_key, decoding_key, cache_config))
    }

    /// Create a manager from the key files and cache settings of `config`
    ///
    /// Keys are never generated here: tokens signed with an ephemeral key
    /// would stop verifying after a restart.
    ///
    /// # Errors
    /// Returns `ConfigError` when no private key path is configured or a key
    /// file cannot be read, `InvalidInput` when the keys do not parse or match
    pub async fn from_config(config: &WebappConfig) -> AppResult<Self> {
        let private_key_path = config
            .jwt
            .private_key_path
            .as_deref()
            .ok_or_else(|| AppError::config("JWT private key path is not configured"))?;
        let keys =
            RsaKeyPair::from_pem_files(private_key_path, config.jwt.public_key_path.as_deref())
                .await?;
        Self::new(&keys, &config.cache_config())
    }

    fn from_keys(
        encoding_key: EncodingKey,
        decoding_key: DecodingKey,
        cache_config: &ClaimsCacheConfig,
    ) -> Self {
        // Time claims are checked after decoding so expired tokens map to AuthExpired
        let mut validation = Validation::new(Algorithm::PS512);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Self {
            encoding_key: Arc::new(encoding_key),
            decoding_key: Arc::new(decoding_key),
            validation: Arc::new(validation),
            cache: ClaimsCache::new(cache_config),
        }
    }

    /// Validated-token cache
    #[must_use]
    pub const fn cache(&self) -> &ClaimsCache<D> {
        &self.cache
    }

    async fn verify(&self, token: &str) -> AppResult<Claims<D>> {
        let header = decode_header(token).map_err(|e| {
            debug!(error = %e, "Failed to decode JWT header");
            AppError::auth_invalid("Invalid token format")
        })?;
        if header.alg != Algorithm::PS512 {
            warn!(alg = ?header.alg, "Rejected JWT signed with unexpected algorithm");
            return Err(AppError::auth_invalid("Unexpected signing algorithm"));
        }

        let key = Arc::clone(&self.decoding_key);
        let validation = Arc::clone(&self.validation);
        let owned = token.to_owned();
        let decoded = task::spawn_blocking(move || decode::<Claims<D>>(&owned, &key, &validation))
            .await
            .map_err(|e| AppError::internal(format!("JWT verification task failed: {e}")))?;

        decoded.map(|data| data.claims).map_err(|e| {
            warn!(error = %e, "Rejected JWT");
            AppError::auth_invalid("Invalid token")
        })
    }
}

#[async_trait]
impl<D> JwtManager for Ps512Manager<D>
where
    D: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    type Payload = D;

    fn alg(&self) -> &'static str {
        JWT_ALGORITHM
    }

    async fn sign(&self, claims: Claims<D>) -> AppResult<String> {
        let key = Arc::clone(&self.encoding_key);
        task::spawn_blocking(move || encode(&Header::new(Algorithm::PS512), &claims, &key))
            .await
            .map_err(|e| AppError::internal(format!("JWT signing task failed: {e}")))?
            .map_err(|e| AppError::internal(format!("Failed to sign JWT: {e}")))
    }

    async fn parse(&self, token: &str) -> AppResult<Claims<D>> {
        match self.cache.lookup(token).await {
            Lookup::Fresh(claims) => {
                debug!("Using cached JWT claims");
                return Ok(claims);
            }
            Lookup::Expired => {
                debug!("Cached JWT has expired, evicted");
                return Err(AppError::auth_expired());
            }
            Lookup::Miss => {}
        }

        let claims = self.verify(token).await?;
        let now = Utc::now().timestamp();
        if claims.is_expired_at(now) {
            debug!(exp = ?claims.exp, "JWT has expired");
            return Err(AppError::auth_expired());
        }
        if claims.is_not_yet_valid_at(now) {
            debug!(nbf = ?claims.nbf, iat = ?claims.iat, "JWT is not valid yet");
            return Err(AppError::auth_invalid("Token is not valid yet"));
        }

        self.cache.put(token.to_owned(), claims.clone()).await;
        Ok(claims)
    }
}
