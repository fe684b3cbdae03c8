// ABOUTME: Helper modules for gymtrack-cli
// ABOUTME: Output formatting and slot lookup shared by the commands
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gymtrack Contributors

pub mod display;
pub mod session;
