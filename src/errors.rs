// ABOUTME: Re-exports the unified error types from webapp-core
// ABOUTME: Keeps `webapp::errors::AppError` as the public path for callers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

pub use webapp_core::errors::*;
