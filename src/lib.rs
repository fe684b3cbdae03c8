// ABOUTME: Main library entry point for the Gymtrack workout client
// ABOUTME: Authentication, data access, and the active-workout view-model over a hosted backend
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gymtrack Contributors

#![deny(unsafe_code)]

//! # Gymtrack
//!
//! Client library for a gym-tracking app whose state lives entirely in a hosted
//! relational backend. Users authenticate, browse workout templates, run an
//! active workout (logging sets, swapping exercises, resting between sets) and
//! review a post-workout summary.
//!
//! ## Architecture
//!
//! - **backend**: row-level CRUD (`Backend` trait) over HTTP or in memory
//! - **auth**: identity API client and the `AuthStore` session container
//! - **database**: thin per-collection managers built on `Backend`
//! - **workout**: `ActiveWorkoutStore` view-model, stats, set input rows,
//!   rest timer, summaries and history
//! - **config** / **logging**: environment configuration and tracing setup
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use gymtrack::client::GymtrackClient;
//! use gymtrack::config::ClientConfig;
//! use gymtrack::errors::AppResult;
//!
//! # async fn example() -> AppResult<()> {
//! let config = ClientConfig::from_env().map_err(|e| gymtrack::errors::AppError::config(e.to_string()))?;
//! let client = GymtrackClient::connect(&config)?;
//! client.auth().sign_in("lifter@example.com", "secret").await?;
//! let templates = client.templates().list_for_user(client.auth().require_user_id().await?).await?;
//! println!("{} templates", templates.len());
//! # Ok(())
//! # }
//! ```

// Re-export core modules so the rest of the crate can use `crate::errors` etc.
pub use gymtrack_core::constants;
pub use gymtrack_core::models;

/// Identity API client and authentication session container
pub mod auth;

/// Row-level data access over the hosted backend
pub mod backend;

/// Wiring of backend, identity, and state containers
pub mod client;

/// Configuration management
pub mod config;

/// Per-collection data managers
pub mod database;

/// Unified error handling
pub mod errors;

/// Structured logging setup
pub mod logging;

/// Active-workout view-model, timers, and summaries
pub mod workout;
