// ABOUTME: Configuration module for collection names, OR engine tuning and JWT settings
// ABOUTME: Re-exports the environment-driven configuration types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Configuration for the webapp managers
//!
//! Every setting has a default; [`WebappConfig::from_env`] overrides them
//! from `WEBAPP_*` environment variables.

/// Environment variable parsing
pub mod environment;

pub use environment::{keys, CollectionConfig, JwtConfig, OrConfig, WebappConfig};
