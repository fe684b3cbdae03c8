// ABOUTME: Client configuration loaded from environment variables with typed defaults
// ABOUTME: Covers backend endpoint, anonymous key, timeouts, session refresh, and swap policy
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gymtrack Contributors

use crate::constants::{session, timer};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Environment type for logging and defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment
    #[default]
    Development,
    /// Production environment
    Production,
    /// Testing environment
    Testing,
}

impl Environment {
    /// Parse from string with fallback to development
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// What happens to logged sets when a session slot's exercise is swapped
///
/// The visible list is always cleared; this only controls the stored rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SwapPolicy {
    /// Rows stay in storage, hidden from the session view
    #[default]
    KeepSets,
    /// Rows are deleted before the swap
    DeleteSets,
}

impl SwapPolicy {
    /// Parse `keep` / `delete` (and the long variant names)
    ///
    /// # Errors
    ///
    /// Returns an error for any other value
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "keep" | "keep_sets" => Ok(Self::KeepSets),
            "delete" | "delete_sets" => Ok(Self::DeleteSets),
            other => bail!("Invalid swap policy '{other}', expected 'keep' or 'delete'"),
        }
    }
}

/// Everything needed to reach the backend and run sessions
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Project base URL (data API under `/rest/v1`, identity under `/auth/v1`)
    pub backend_url: String,
    /// Anonymous (publishable) API key
    pub anon_key: String,
    /// Whole-request timeout
    pub http_timeout: Duration,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Rest timer duration when a slot has no `rest_seconds`
    pub default_rest_secs: u64,
    /// Refresh the session when it expires within this many seconds
    pub refresh_margin_secs: i64,
    /// How often the foreground refresh task checks the session
    pub refresh_interval: Duration,
    /// Handling of logged sets on exercise swap
    pub swap_policy: SwapPolicy,
    /// Where the signed-in session is persisted
    pub session_file: PathBuf,
    /// Deployment environment
    pub environment: Environment,
}

impl ClientConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value does not parse
    pub fn from_env() -> Result<Self> {
        let backend_url = env::var("GYMTRACK_BACKEND_URL")
            .context("GYMTRACK_BACKEND_URL must be set to the backend project URL")?;
        let anon_key = env::var("GYMTRACK_ANON_KEY")
            .context("GYMTRACK_ANON_KEY must be set to the backend anonymous key")?;

        let config = Self {
            backend_url,
            anon_key,
            http_timeout: Duration::from_secs(
                env_var_or("GYMTRACK_HTTP_TIMEOUT_SECS", "30")
                    .parse()
                    .context("Invalid GYMTRACK_HTTP_TIMEOUT_SECS value")?,
            ),
            connect_timeout: Duration::from_secs(
                env_var_or("GYMTRACK_CONNECT_TIMEOUT_SECS", "10")
                    .parse()
                    .context("Invalid GYMTRACK_CONNECT_TIMEOUT_SECS value")?,
            ),
            default_rest_secs: env_var_or(
                "GYMTRACK_DEFAULT_REST_SECS",
                &timer::DEFAULT_REST_SECS.to_string(),
            )
            .parse()
            .context("Invalid GYMTRACK_DEFAULT_REST_SECS value")?,
            refresh_margin_secs: env_var_or(
                "GYMTRACK_REFRESH_MARGIN_SECS",
                &session::REFRESH_MARGIN_SECS.to_string(),
            )
            .parse()
            .context("Invalid GYMTRACK_REFRESH_MARGIN_SECS value")?,
            refresh_interval: Duration::from_secs(
                env_var_or(
                    "GYMTRACK_REFRESH_INTERVAL_SECS",
                    &session::REFRESH_INTERVAL_SECS.to_string(),
                )
                .parse()
                .context("Invalid GYMTRACK_REFRESH_INTERVAL_SECS value")?,
            ),
            swap_policy: SwapPolicy::parse(&env_var_or("GYMTRACK_SWAP_POLICY", "keep"))
                .context("Invalid GYMTRACK_SWAP_POLICY value")?,
            session_file: env::var("GYMTRACK_SESSION_FILE")
                .map_or_else(|_| default_session_file(), PathBuf::from),
            environment: Environment::from_str_or_default(&env_var_or(
                "ENVIRONMENT",
                "development",
            )),
        };

        info!(
            backend = %config.backend_url,
            environment = %config.environment,
            "Loaded client configuration"
        );
        Ok(config)
    }

    /// Configuration for `backend_url` with every other field at its default
    #[must_use]
    pub fn new(backend_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            backend_url: backend_url.into(),
            anon_key: anon_key.into(),
            http_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            default_rest_secs: timer::DEFAULT_REST_SECS,
            refresh_margin_secs: session::REFRESH_MARGIN_SECS,
            refresh_interval: Duration::from_secs(session::REFRESH_INTERVAL_SECS),
            swap_policy: SwapPolicy::default(),
            session_file: default_session_file(),
            environment: Environment::default(),
        }
    }

    /// Summary of the configuration for logging (without secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Gymtrack Client Configuration:\n\
             - Backend: {}\n\
             - Anonymous key: {}\n\
             - HTTP timeout: {}s (connect {}s)\n\
             - Default rest: {}s\n\
             - Swap policy: {:?}\n\
             - Session file: {}\n\
             - Environment: {}",
            self.backend_url,
            if self.anon_key.is_empty() { "missing" } else { "set" },
            self.http_timeout.as_secs(),
            self.connect_timeout.as_secs(),
            self.default_rest_secs,
            self.swap_policy,
            self.session_file.display(),
            self.environment,
        )
    }
}

/// `<config dir>/gymtrack/session.json`, or the working directory if no config dir exists
#[must_use]
pub fn default_session_file() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join(session::APP_DIR_NAME))
        .unwrap_or_default()
        .join(session::SESSION_FILE_NAME)
}

/// Get environment variable or default value
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swap_policy_parse() {
        assert_eq!(SwapPolicy::parse("keep").unwrap(), SwapPolicy::KeepSets);
        assert_eq!(SwapPolicy::parse(" DELETE ").unwrap(), SwapPolicy::DeleteSets);
        assert!(SwapPolicy::parse("archive").is_err());
    }

    #[test]
    fn test_summary_hides_key() {
        let config = ClientConfig::new("https://project.example.co", "secret-key");
        let summary = config.summary();
        assert!(summary.contains("https://project.example.co"));
        assert!(!summary.contains("secret-key"));
    }
}
