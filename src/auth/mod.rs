// ABOUTME: Authentication against the hosted identity service and local session handling
// ABOUTME: Identity provider trait, session types, session persistence, and the auth state container
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gymtrack Contributors

//! # Authentication and Session Management
//!
//! Password sign-in, sign-up, token refresh and sign-out are delegated to a
//! hosted identity service behind the [`IdentityProvider`] trait. The
//! [`AuthStore`] keeps the signed-in [`Session`], persists it through a
//! [`SessionStorage`], publishes the access token to HTTP backends through
//! [`crate::backend::AuthToken`], and refreshes it in the background while the
//! app is in the foreground.

/// In-process identity provider
pub mod memory;
/// HTTP identity provider
pub mod rest;
/// Session persistence
pub mod storage;
/// Authentication state container
pub mod store;

pub use memory::MemoryIdentity;
pub use rest::RestIdentity;
pub use storage::{FileSessionStorage, MemorySessionStorage, SessionStorage};
pub use store::{AppState, AuthState, AuthStatus, AuthStore};

use crate::errors::AppResult;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// User record returned by the identity service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Identity user id, also the profile id
    pub id: Uuid,
    /// Account email
    #[serde(default)]
    pub email: Option<String>,
}

/// A signed-in session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token for data API requests
    pub access_token: String,
    /// Token exchanged for a new session
    pub refresh_token: String,
    /// Access token expiry
    pub expires_at: DateTime<Utc>,
    /// Signed-in user
    pub user: AuthUser,
}

impl Session {
    /// Whether the access token expires within `margin_secs` of `now`
    #[must_use]
    pub fn expires_within(&self, margin_secs: i64, now: DateTime<Utc>) -> bool {
        self.expires_at - now <= Duration::seconds(margin_secs)
    }

    /// Whether the access token has already expired
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Result of a sign-up
///
/// `session` is `None` when the service requires email confirmation first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpOutcome {
    /// Created user
    pub user: AuthUser,
    /// Session, when the account is usable immediately
    pub session: Option<Session>,
}

/// Hosted identity service
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Provider name for logs
    fn name(&self) -> &'static str;

    /// Exchange email and password for a session
    async fn sign_in_with_password(&self, email: &str, password: &str) -> AppResult<Session>;

    /// Create an account
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> AppResult<SignUpOutcome>;

    /// Exchange a refresh token for a new session
    async fn refresh_session(&self, refresh_token: &str) -> AppResult<Session>;

    /// Revoke the session's refresh tokens
    async fn sign_out(&self, access_token: &str) -> AppResult<()>;

    /// User owning `access_token`; fails if the service no longer accepts it
    async fn get_user(&self, access_token: &str) -> AppResult<AuthUser>;
}

/// Shared handle to the configured identity provider
pub type SharedIdentity = Arc<dyn IdentityProvider>;
