// ABOUTME: Core types and constants for the Gymtrack workout client
// ABOUTME: Foundation crate with error handling, domain models, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gymtrack Contributors

#![deny(unsafe_code)]

//! # Gymtrack Core
//!
//! Foundation crate shared by the Gymtrack client library and its CLI. It holds
//! no I/O: only the row types mirrored from the backend, the unified error type
//! and constants.
//!
//! ## Modules
//!
//! - **errors**: `AppError`, `ErrorCode`, `AppResult`
//! - **models**: profiles, exercises, templates, workouts, sets, personal records
//! - **constants**: collection names, timer and session settings

/// Unified error handling with stable error codes
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Row types mirrored from the backend collections
pub mod models;
