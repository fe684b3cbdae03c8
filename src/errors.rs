// ABOUTME: Unified error types for the client re-exported from gymtrack-core
// ABOUTME: Provides AppError, ErrorCode and AppResult to every module of the library
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gymtrack Contributors

pub use gymtrack_core::errors::*;
