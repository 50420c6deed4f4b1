// ABOUTME: Core data models: remember-me tokens, directory users, and JWT claims
// ABOUTME: Serde field names of stored models match the existing document collections
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

/// Remember-me token record
pub mod token;

/// Directory user record
pub mod user;

/// JWT claims with a custom `dat` payload
pub mod claims;

pub use claims::{Audience, Claims};
pub use token::Token;
pub use user::User;
