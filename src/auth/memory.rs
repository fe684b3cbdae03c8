// ABOUTME: In-process identity provider with password accounts and rotating refresh tokens
// ABOUTME: Mirrors the hosted service's error messages; used by tests and the offline demo
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gymtrack Contributors

use super::{AuthUser, IdentityProvider, Session, SignUpOutcome};
use crate::errors::{AppError, AppResult};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone)]
struct Account {
    password: String,
    user: AuthUser,
}

#[derive(Debug, Default)]
struct Tokens {
    /// refresh token -> user id
    refresh: HashMap<String, Uuid>,
    /// access token -> user id
    access: HashMap<String, Uuid>,
}

/// Identity provider holding accounts in memory
#[derive(Debug)]
pub struct MemoryIdentity {
    accounts: RwLock<HashMap<String, Account>>,
    tokens: RwLock<Tokens>,
    token_lifetime: Duration,
    require_confirmation: bool,
    refreshes: AtomicUsize,
}

impl Default for MemoryIdentity {
    fn default() -> Self {
        Self {
            accounts: RwLock::default(),
            tokens: RwLock::default(),
            token_lifetime: Duration::hours(1),
            require_confirmation: false,
            refreshes: AtomicUsize::new(0),
        }
    }
}

impl MemoryIdentity {
    /// Create a provider with one-hour access tokens
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue access tokens valid for `lifetime`
    #[must_use]
    pub const fn with_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.token_lifetime = lifetime;
        self
    }

    /// Require email confirmation: sign-up returns no session
    #[must_use]
    pub const fn with_email_confirmation(mut self, required: bool) -> Self {
        self.require_confirmation = required;
        self
    }

    /// Register an account directly, returning its user
    pub async fn add_account(&self, email: &str, password: &str) -> AuthUser {
        let user = AuthUser {
            id: Uuid::new_v4(),
            email: Some(email.to_owned()),
        };
        self.accounts.write().await.insert(
            email.to_lowercase(),
            Account {
                password: password.to_owned(),
                user: user.clone(),
            },
        );
        user
    }

    /// Number of successful refreshes served
    #[must_use]
    pub fn refresh_count(&self) -> usize {
        self.refreshes.load(Ordering::Relaxed)
    }

    async fn issue(&self, user: AuthUser) -> Session {
        let session = Session {
            access_token: format!("access-{}", Uuid::new_v4()),
            refresh_token: format!("refresh-{}", Uuid::new_v4()),
            expires_at: Utc::now() + self.token_lifetime,
            user,
        };
        let mut tokens = self.tokens.write().await;
        tokens
            .refresh
            .insert(session.refresh_token.clone(), session.user.id);
        tokens
            .access
            .insert(session.access_token.clone(), session.user.id);
        session
    }

    async fn user_by_id(&self, user_id: Uuid) -> Option<AuthUser> {
        self.accounts
            .read()
            .await
            .values()
            .find(|a| a.user.id == user_id)
            .map(|a| a.user.clone())
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentity {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> AppResult<Session> {
        let account = self
            .accounts
            .read()
            .await
            .get(&email.trim().to_lowercase())
            .cloned();
        match account {
            Some(account) if account.password == password => Ok(self.issue(account.user).await),
            _ => Err(AppError::auth_invalid("Invalid login credentials").with_http_status(400)),
        }
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        _display_name: Option<&str>,
    ) -> AppResult<SignUpOutcome> {
        let key = email.trim().to_lowercase();
        if !key.contains('@') {
            return Err(AppError::auth_invalid("Unable to validate email address: invalid format")
                .with_http_status(400));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AppError::auth_invalid(format!(
                "Password should be at least {MIN_PASSWORD_LEN} characters."
            ))
            .with_http_status(422));
        }
        if self.accounts.read().await.contains_key(&key) {
            return Err(AppError::auth_invalid("User already registered").with_http_status(422));
        }

        let user = self.add_account(&key, password).await;
        let session = if self.require_confirmation {
            None
        } else {
            Some(self.issue(user.clone()).await)
        };
        Ok(SignUpOutcome { user, session })
    }

    async fn refresh_session(&self, refresh_token: &str) -> AppResult<Session> {
        // Refresh tokens are single use
        let user_id = self.tokens.write().await.refresh.remove(refresh_token);
        let Some(user_id) = user_id else {
            return Err(AppError::auth_invalid(
                "Invalid Refresh Token: Refresh Token Not Found",
            )
            .with_http_status(400));
        };
        let user = self
            .user_by_id(user_id)
            .await
            .ok_or_else(|| AppError::auth_invalid("User not found").with_http_status(404))?;
        self.refreshes.fetch_add(1, Ordering::Relaxed);
        Ok(self.issue(user).await)
    }

    async fn sign_out(&self, access_token: &str) -> AppResult<()> {
        let mut tokens = self.tokens.write().await;
        let Some(user_id) = tokens.access.remove(access_token) else {
            return Err(AppError::auth_invalid("invalid JWT").with_http_status(401));
        };
        tokens.refresh.retain(|_, owner| *owner != user_id);
        tokens.access.retain(|_, owner| *owner != user_id);
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> AppResult<AuthUser> {
        let user_id = self.tokens.read().await.access.get(access_token).copied();
        let invalid = || AppError::auth_invalid("invalid JWT").with_http_status(401);
        let user_id = user_id.ok_or_else(invalid)?;
        self.user_by_id(user_id).await.ok_or_else(invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sign_in_rejects_wrong_password() {
        let identity = MemoryIdentity::new();
        identity.add_account("lifter@example.com", "hunter22").await;

        let err = identity
            .sign_in_with_password("lifter@example.com", "nope")
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Invalid login credentials");
        assert!(identity
            .sign_in_with_password("Lifter@Example.com", "hunter22")
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_refresh_tokens_are_single_use() {
        let identity = MemoryIdentity::new();
        identity.add_account("lifter@example.com", "hunter22").await;
        let session = identity
            .sign_in_with_password("lifter@example.com", "hunter22")
            .await
            .unwrap();

        let refreshed = identity
            .refresh_session(&session.refresh_token)
            .await
            .unwrap();
        assert_ne!(refreshed.access_token, session.access_token);
        assert!(identity
            .refresh_session(&session.refresh_token)
            .await
            .is_err());
        assert_eq!(identity.refresh_count(), 1);
    }

    #[tokio::test]
    async fn test_sign_up_duplicate_email() {
        let identity = MemoryIdentity::new();
        identity
            .sign_up("lifter@example.com", "hunter22", None)
            .await
            .unwrap();
        let err = identity
            .sign_up("lifter@example.com", "hunter22", None)
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "User already registered");
    }

    #[tokio::test]
    async fn test_sign_out_revokes_refresh_tokens() {
        let identity = MemoryIdentity::new();
        let outcome = identity
            .sign_up("lifter@example.com", "hunter22", Some("Lifter"))
            .await
            .unwrap();
        let session = outcome.session.unwrap();

        identity.sign_out(&session.access_token).await.unwrap();
        assert!(identity
            .refresh_session(&session.refresh_token)
            .await
            .is_err());
    }
}
