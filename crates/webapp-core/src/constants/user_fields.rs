// ABOUTME: Stored field names for user documents
// ABOUTME: The uid is the document identifier and has no stored field
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

/// Login name, unique across users
pub const USERNAME: &str = "Username";

/// Email address, unique across users
pub const EMAIL: &str = "Email";

/// Phone number, unique across users
pub const PHONE_NUMBER: &str = "PhoneNumber";

/// Password as provided by the caller
pub const PASSWORD: &str = "Password";

/// Display name
pub const DISPLAY_NAME: &str = "DisplayName";

/// Profile photo URL
pub const PHOTO_URL: &str = "PhotoURL";

/// Suspension flag
pub const SUSPENDED: &str = "Suspended";
