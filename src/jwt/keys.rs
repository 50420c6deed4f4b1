// ABOUTME: RSA key pair handling for PS512 signing: generation, PEM import and export
// ABOUTME: Produces jsonwebtoken encoding and decoding keys from the pair
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::path::Path;

use jsonwebtoken::{DecodingKey, EncodingKey};
use rand::rngs::OsRng;
use rsa::pkcs8::{
    DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding,
};
use rsa::{RsaPrivateKey, RsaPublicKey};
use tokio::fs;
use tracing::debug;

use crate::constants::RSA_KEY_SIZE;
use crate::errors::{AppError, AppResult};

/// RSA private/public key pair
#[derive(Debug, Clone)]
pub struct RsaKeyPair {
    /// Signing key
    pub private_key: RsaPrivateKey,
    /// Verification key
    pub public_key: RsaPublicKey,
}

impl RsaKeyPair {
    /// Generate a 4096-bit key pair
    ///
    /// # Errors
    /// Returns an error if key generation fails
    pub fn generate() -> AppResult<Self> {
        Self::generate_with_key_size(RSA_KEY_SIZE)
    }

    /// Generate a key pair of the given size
    ///
    /// 2048 bits keeps tests fast; production keys should use the default.
    ///
    /// # Errors
    /// Returns an error if key generation fails
    pub fn generate_with_key_size(key_size_bits: usize) -> AppResult<Self> {
        let mut rng = OsRng;
        let private_key = RsaPrivateKey::new(&mut rng, key_size_bits)
            .map_err(|e| AppError::internal(format!("Failed to generate RSA private key: {e}")))?;
        let public_key = RsaPublicKey::from(&private_key);
        debug!(key_size_bits, "Generated RSA key pair");

        Ok(Self {
            private_key,
            public_key,
        })
    }

    /// Export the private key as PKCS#8 PEM
    ///
    /// # Errors
    /// Returns an error if PEM encoding fails
    pub fn export_private_key_pem(&self) -> AppResult<String> {
        self.private_key
            .to_pkcs8_pem(LineEnding::LF)
            .map(|pem| pem.to_string())
            .map_err(|e| AppError::internal(format!("Failed to export private key as PEM: {e}")))
    }

    /// Export the public key as SPKI PEM
    ///
    /// # Errors
    /// Returns an error if PEM encoding fails
    pub fn export_public_key_pem(&self) -> AppResult<String> {
        self.public_key
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| AppError::internal(format!("Failed to export public key as PEM: {e}")))
    }

    /// Import a key pair from a PKCS#8 private key PEM
    ///
    /// # Errors
    /// Returns `InvalidInput` if the PEM cannot be parsed
    pub fn import_private_key_pem(pem: &str) -> AppResult<Self> {
        let private_key = RsaPrivateKey::from_pkcs8_pem(pem)
            .map_err(|e| AppError::invalid_input(format!("Failed to parse private key PEM: {e}")))?;
        let public_key = RsaPublicKey::from(&private_key);
        Ok(Self {
            private_key,
            public_key,
        })
    }

    /// Import a key pair from PEM files
    ///
    /// When `public_key_path` is given its key must match the private key.
    ///
    /// # Errors
    /// Returns an error if a file cannot be read or parsed, or the keys differ
    pub async fn from_pem_files(
        private_key_path: &Path,
        public_key_path: Option<&Path>,
    ) -> AppResult<Self> {
        let private_pem = read_pem(private_key_path).await?;
        let pair = Self::import_private_key_pem(&private_pem)?;

        if let Some(path) = public_key_path {
            let public_pem = read_pem(path).await?;
            let public_key = RsaPublicKey::from_public_key_pem(&public_pem).map_err(|e| {
                AppError::invalid_input(format!("Failed to parse public key PEM: {e}"))
            })?;
            if public_key != pair.public_key {
                return Err(AppError::invalid_input(
                    "Public key does not match the private key",
                ));
            }
        }
        Ok(pair)
    }

    /// Key used by jsonwebtoken to sign
    ///
    /// # Errors
    /// Returns an error if the key cannot be converted
    pub fn encoding_key(&self) -> AppResult<EncodingKey> {
        let pem = self.export_private_key_pem()?;
        EncodingKey::from_rsa_pem(pem.as_bytes())
            .map_err(|e| AppError::internal(format!("Failed to create encoding key: {e}")))
    }

    /// Key used by jsonwebtoken to verify
    ///
    /// # Errors
    /// Returns an error if the key cannot be converted
    pub fn decoding_key(&self) -> AppResult<DecodingKey> {
        let pem = self.export_public_key_pem()?;
        DecodingKey::from_rsa_pem(pem.as_bytes())
            .map_err(|e| AppError::internal(format!("Failed to create decoding key: {e}")))
    }
}

async fn read_pem(path: &Path) -> AppResult<String> {
    fs::read_to_string(path).await.map_err(|e| {
        AppError::config(format!("Failed to read key file {}: {e}", path.display()))
    })
}
