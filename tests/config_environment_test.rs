// ABOUTME: Tests for environment-driven client configuration
// ABOUTME: Validates required variables, defaults, overrides, and parse errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gymtrack Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use gymtrack::config::{ClientConfig, Environment, SwapPolicy};
use gymtrack::constants::{session, timer};
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

const VARS: &[&str] = &[
    "GYMTRACK_BACKEND_URL",
    "GYMTRACK_ANON_KEY",
    "GYMTRACK_HTTP_TIMEOUT_SECS",
    "GYMTRACK_CONNECT_TIMEOUT_SECS",
    "GYMTRACK_DEFAULT_REST_SECS",
    "GYMTRACK_REFRESH_MARGIN_SECS",
    "GYMTRACK_REFRESH_INTERVAL_SECS",
    "GYMTRACK_SWAP_POLICY",
    "GYMTRACK_SESSION_FILE",
    "ENVIRONMENT",
];

fn clear_env() {
    for var in VARS {
        env::remove_var(var);
    }
}

fn set_required() {
    env::set_var("GYMTRACK_BACKEND_URL", "https://project.example.co");
    env::set_var("GYMTRACK_ANON_KEY", "anon-key");
}

#[test]
fn test_environment_parsing() {
    assert_eq!(
        Environment::from_str_or_default("PROD"),
        Environment::Production
    );
    assert_eq!(Environment::from_str_or_default("test"), Environment::Testing);
    assert_eq!(
        Environment::from_str_or_default("staging"),
        Environment::Development
    ); // Default fallback
    assert!(Environment::Production.is_production());
    assert_eq!(Environment::Testing.to_string(), "testing");
}

#[test]
#[serial]
fn test_missing_backend_url_is_an_error() {
    clear_env();
    env::set_var("GYMTRACK_ANON_KEY", "anon-key");

    let err = ClientConfig::from_env().unwrap_err();
    assert!(format!("{err:#}").contains("GYMTRACK_BACKEND_URL"));
    clear_env();
}

#[test]
#[serial]
fn test_missing_anon_key_is_an_error() {
    clear_env();
    env::set_var("GYMTRACK_BACKEND_URL", "https://project.example.co");

    let err = ClientConfig::from_env().unwrap_err();
    assert!(format!("{err:#}").contains("GYMTRACK_ANON_KEY"));
    clear_env();
}

#[test]
#[serial]
fn test_defaults_apply() {
    clear_env();
    set_required();

    let config = ClientConfig::from_env().unwrap();
    assert_eq!(config.backend_url, "https://project.example.co");
    assert_eq!(config.anon_key, "anon-key");
    assert_eq!(config.http_timeout, Duration::from_secs(30));
    assert_eq!(config.connect_timeout, Duration::from_secs(10));
    assert_eq!(config.default_rest_secs, timer::DEFAULT_REST_SECS);
    assert_eq!(config.refresh_margin_secs, session::REFRESH_MARGIN_SECS);
    assert_eq!(
        config.refresh_interval,
        Duration::from_secs(session::REFRESH_INTERVAL_SECS)
    );
    assert_eq!(config.swap_policy, SwapPolicy::KeepSets);
    assert_eq!(config.environment, Environment::Development);
    assert!(config.session_file.ends_with(session::SESSION_FILE_NAME));
    clear_env();
}

#[test]
#[serial]
fn test_overrides_apply() {
    clear_env();
    set_required();
    env::set_var("GYMTRACK_HTTP_TIMEOUT_SECS", "5");
    env::set_var("GYMTRACK_DEFAULT_REST_SECS", "120");
    env::set_var("GYMTRACK_REFRESH_INTERVAL_SECS", "15");
    env::set_var("GYMTRACK_SWAP_POLICY", "delete");
    env::set_var("GYMTRACK_SESSION_FILE", "/tmp/gymtrack-test/session.json");
    env::set_var("ENVIRONMENT", "production");

    let config = ClientConfig::from_env().unwrap();
    assert_eq!(config.http_timeout, Duration::from_secs(5));
    assert_eq!(config.default_rest_secs, 120);
    assert_eq!(config.refresh_interval, Duration::from_secs(15));
    assert_eq!(config.swap_policy, SwapPolicy::DeleteSets);
    assert_eq!(
        config.session_file,
        PathBuf::from("/tmp/gymtrack-test/session.json")
    );
    assert!(config.environment.is_production());
    clear_env();
}

#[test]
#[serial]
fn test_invalid_values_are_rejected() {
    clear_env();
    set_required();
    env::set_var("GYMTRACK_DEFAULT_REST_SECS", "ninety");
    let err = ClientConfig::from_env().unwrap_err();
    assert!(format!("{err:#}").contains("GYMTRACK_DEFAULT_REST_SECS"));

    env::remove_var("GYMTRACK_DEFAULT_REST_SECS");
    env::set_var("GYMTRACK_SWAP_POLICY", "archive");
    let err = ClientConfig::from_env().unwrap_err();
    assert!(format!("{err:#}").contains("archive"));
    clear_env();
}

#[test]
fn test_new_uses_defaults() {
    let config = ClientConfig::new("http://localhost:54321", "key");
    assert_eq!(config.default_rest_secs, timer::DEFAULT_REST_SECS);
    assert_eq!(config.swap_policy, SwapPolicy::KeepSets);
    assert!(config.summary().contains("Anonymous key: set"));
}
