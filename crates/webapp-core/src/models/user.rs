// ABOUTME: Directory user record with builder-style setters
// ABOUTME: The uid is the document identifier and is never stored as a field
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use serde::{Deserialize, Serialize};

/// User record stored in the directory collection
///
/// Username, email and phone number are each unique across live records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Document identifier, assigned on insert
    #[serde(skip)]
    pub uid: String,
    /// Login name
    #[serde(rename = "Username", default)]
    pub username: String,
    /// Email address
    #[serde(rename = "Email", default)]
    pub email: String,
    /// Phone number
    #[serde(rename = "PhoneNumber", default)]
    pub phone_number: String,
    /// Password (stored as provided; hashing is the caller's concern)
    #[serde(rename = "Password", default)]
    pub password: String,
    /// Display name
    #[serde(rename = "DisplayName", default)]
    pub display_name: String,
    /// Profile photo URL
    #[serde(rename = "PhotoURL", default)]
    pub photo_url: String,
    /// Whether the account is suspended
    #[serde(rename = "Suspended", default)]
    pub suspended: bool,
}

impl User {
    /// Blank user
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the uid
    #[must_use]
    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = uid.into();
        self
    }

    /// Set the username
    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    /// Set the email
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    /// Set the phone number
    #[must_use]
    pub fn with_phone_number(mut self, phone_number: impl Into<String>) -> Self {
        self.phone_number = phone_number.into();
        self
    }

    /// Set the password
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    /// Set the display name
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    /// Set the photo URL
    #[must_use]
    pub fn with_photo_url(mut self, photo_url: impl Into<String>) -> Self {
        self.photo_url = photo_url.into();
        self
    }

    /// Set the suspension flag
    #[must_use]
    pub const fn with_suspended(mut self, suspended: bool) -> Self {
        self.suspended = suspended;
        self
    }
}
