// ABOUTME: JWT claims carrying a typed custom payload in the `dat` claim
// ABOUTME: Standard registered claims are optional; a missing `exp` means no expiry
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The `aud` claim, which RFC 7519 allows as a string or an array
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    /// Single audience
    One(String),
    /// Several audiences
    Many(Vec<String>),
}

impl Audience {
    /// Whether `audience` is one of the named audiences
    #[must_use]
    pub fn contains(&self, audience: &str) -> bool {
        match self {
            Self::One(one) => one == audience,
            Self::Many(many) => many.iter().any(|item| item == audience),
        }
    }
}

/// JWT claims with a custom `dat` payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims<D = Value> {
    /// Custom payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dat: Option<D>,
    /// Expiration time (unix seconds)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    /// Issued at (unix seconds)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Not before (unix seconds)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
    /// Issuer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Subject
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Audience, a single string or an array of strings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aud: Option<Audience>,
    /// JWT ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

impl<D> Default for Claims<D> {
    fn default() -> Self {
        Self {
            dat: None,
            exp: None,
            iat: None,
            nbf: None,
            iss: None,
            sub: None,
            aud: None,
            jti: None,
        }
    }
}

impl<D> Claims<D> {
    /// Empty claims
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the `dat` payload
    #[must_use]
    pub fn with_dat(mut self, dat: D) -> Self {
        self.dat = Some(dat);
        self
    }

    /// Set the expiry
    #[must_use]
    pub fn with_expiry(mut self, expiry: DateTime<Utc>) -> Self {
        self.exp = Some(expiry.timestamp());
        self
    }

    /// Set the issued-at time
    #[must_use]
    pub fn with_issued_at(mut self, issued_at: DateTime<Utc>) -> Self {
        self.iat = Some(issued_at.timestamp());
        self
    }

    /// Set the not-before time
    #[must_use]
    pub fn with_not_before(mut self, not_before: DateTime<Utc>) -> Self {
        self.nbf = Some(not_before.timestamp());
        self
    }

    /// Set the audience
    #[must_use]
    pub fn with_audience(mut self, audience: Audience) -> Self {
        self.aud = Some(audience);
        self
    }

    /// Set the subject
    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.sub = Some(subject.into());
        self
    }

    /// Set the issuer
    #[must_use]
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.iss = Some(issuer.into());
        self
    }

    /// Expiry as a timestamp
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| DateTime::from_timestamp(exp, 0))
    }

    /// Whether the claims expired strictly before `now` (unix seconds)
    #[must_use]
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.exp.is_some_and(|exp| exp < now)
    }

    /// Whether `nbf` or `iat` lies after `now` (unix seconds)
    #[must_use]
    pub fn is_not_yet_valid_at(&self, now: i64) -> bool {
        self.nbf.is_some_and(|nbf| nbf > now) || self.iat.is_some_and(|iat| iat > now)
    }
}
