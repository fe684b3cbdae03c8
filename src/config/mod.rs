// ABOUTME: Configuration module for backend endpoints, timeouts, and session behavior
// ABOUTME: Re-exports the environment-driven client configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gymtrack Contributors

//! Configuration for the Gymtrack client
//!
//! - **Environment**: backend URL, anonymous key, HTTP timeouts, rest timer
//!   default, session refresh cadence and swap policy, all read from
//!   environment variables

/// Environment-driven client configuration
pub mod environment;

pub use environment::{ClientConfig, Environment, SwapPolicy};
