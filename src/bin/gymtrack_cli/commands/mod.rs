// ABOUTME: Command modules for gymtrack-cli
// ABOUTME: Account, catalog, workout session, review, and offline demo commands
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gymtrack Contributors

pub mod account;
pub mod catalog;
pub mod demo;
pub mod review;
pub mod workout;
