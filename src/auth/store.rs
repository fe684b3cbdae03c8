// ABOUTME: Authentication state container: sign-in, sign-up, sign-out, profile, and token refresh
// ABOUTME: Publishes the access token to data backends and refreshes it while the app is foregrounded
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gymtrack Contributors

use super::{AuthUser, Session, SessionStorage, SharedIdentity};
use crate::backend::AuthToken;
use crate::constants::session::{REFRESH_INTERVAL_SECS, REFRESH_MARGIN_SECS};
use crate::database::ProfileManager;
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::models::{NewProfile, Profile, ProfileUpdate, WeightUnit};
use chrono::Utc;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Coarse authentication status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthStatus {
    /// No session
    #[default]
    SignedOut,
    /// A sign-in, sign-up or restore is in flight
    Loading,
    /// Session present
    SignedIn,
}

/// Application lifecycle notifications driving background refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    /// App visible: keep the session fresh
    Foreground,
    /// App hidden: stop refreshing
    Background,
}

/// Snapshot of the authentication state
#[derive(Debug, Clone, Default)]
pub struct AuthState {
    /// Coarse status
    pub status: AuthStatus,
    /// Current session
    pub session: Option<Session>,
    /// Profile row of the signed-in user
    pub profile: Option<Profile>,
    /// Last failure, as shown to the user
    pub error: Option<String>,
}

impl AuthState {
    /// Signed-in user, if any
    #[must_use]
    pub fn user(&self) -> Option<&AuthUser> {
        self.session.as_ref().map(|s| &s.user)
    }
}

/// Owns the signed-in session
pub struct AuthStore {
    identity: SharedIdentity,
    storage: Arc<dyn SessionStorage>,
    profiles: ProfileManager,
    token: AuthToken,
    state: RwLock<AuthState>,
    refresh_margin_secs: i64,
    refresh_interval: Duration,
    refresh_task: Mutex<Option<JoinHandle<()>>>,
}

impl AuthStore {
    /// Create a signed-out store
    ///
    /// `token` is shared with the HTTP backend so data requests carry the
    /// user's access token once signed in.
    #[must_use]
    pub fn new(
        identity: SharedIdentity,
        storage: Arc<dyn SessionStorage>,
        profiles: ProfileManager,
        token: AuthToken,
    ) -> Self {
        Self {
            identity,
            storage,
            profiles,
            token,
            state: RwLock::new(AuthState::default()),
            refresh_margin_secs: REFRESH_MARGIN_SECS,
            refresh_interval: Duration::from_secs(REFRESH_INTERVAL_SECS),
            refresh_task: Mutex::new(None),
        }
    }

    /// Override the refresh margin and background check interval
    #[must_use]
    pub const fn with_refresh_timing(mut self, margin_secs: i64, interval: Duration) -> Self {
        self.refresh_margin_secs = margin_secs;
        self.refresh_interval = interval;
        self
    }

    /// Current state
    pub async fn snapshot(&self) -> AuthState {
        self.state.read().await.clone()
    }

    /// Signed-in user id, if any
    pub async fn user_id(&self) -> Option<Uuid> {
        self.state.read().await.user().map(|u| u.id)
    }

    /// Signed-in user id or `AuthRequired`
    pub async fn require_user_id(&self) -> AppResult<Uuid> {
        self.user_id().await.ok_or_else(AppError::auth_required)
    }

    /// Whether a session is present
    pub async fn is_signed_in(&self) -> bool {
        self.state.read().await.status == AuthStatus::SignedIn
    }

    async fn set_loading(&self) {
        let mut state = self.state.write().await;
        state.status = AuthStatus::Loading;
        state.error = None;
    }

    async fn fail(&self, status: AuthStatus, error: &AppError) {
        let mut state = self.state.write().await;
        state.status = status;
        state.error = Some(error.user_message().to_owned());
    }

    /// Persist and publish a new session without touching the profile
    async fn install_session(&self, session: &Session) {
        if let Err(e) = self.storage.save(session).await {
            warn!(error = %e, "Failed to persist session");
        }
        self.token.set(Some(session.access_token.clone())).await;
        let mut state = self.state.write().await;
        state.session = Some(session.clone());
        state.status = AuthStatus::SignedIn;
        state.error = None;
    }

    async fn clear_session(&self) {
        if let Err(e) = self.storage.clear().await {
            warn!(error = %e, "Failed to clear persisted session");
        }
        self.token.set(None).await;
        *self.state.write().await = AuthState::default();
    }

    /// Fetch the profile row, creating it when the account has none yet
    async fn load_profile(&self, user: &AuthUser) -> AppResult<Profile> {
        if let Some(profile) = self.profiles.get(user.id).await? {
            return Ok(profile);
        }
        debug!(user_id = %user.id, "No profile row, creating one");
        self.profiles
            .create(&NewProfile {
                id: user.id,
                email: user.email.clone().unwrap_or_default(),
                display_name: None,
                unit_preference: WeightUnit::default(),
            })
            .await
    }

    /// Load the profile into state; failures are logged and leave it empty
    async fn refresh_profile(&self, user: &AuthUser) {
        match self.load_profile(user).await {
            Ok(profile) => self.state.write().await.profile = Some(profile),
            Err(e) => warn!(user_id = %user.id, error = %e, "Failed to load profile"),
        }
    }

    /// Bring a persisted session up to date
    ///
    /// Sessions close to expiry are refreshed. Others are checked against the
    /// identity service and refreshed if their access token was rejected.
    /// Only a rejected refresh token drops the session; when the service
    /// cannot be reached the session is kept as stored.
    async fn revalidate(&self, session: Session) -> Option<Session> {
        if !session.expires_within(self.refresh_margin_secs, Utc::now()) {
            match self.identity.get_user(&session.access_token).await {
                Ok(user) => return Some(Session { user, ..session }),
                Err(e) if e.code.is_auth() => {
                    debug!(error = %e, "Persisted access token rejected, refreshing");
                }
                Err(e) => {
                    warn!(error = %e, "Could not verify persisted session, keeping it");
                    return Some(session);
                }
            }
        }
        match self.identity.refresh_session(&session.refresh_token).await {
            Ok(fresh) => Some(fresh),
            Err(e) if e.code.is_auth() => {
                info!(error = %e, "Persisted session could not be refreshed");
                None
            }
            Err(e) => {
                warn!(error = %e, "Could not refresh persisted session, keeping it");
                Some(session)
            }
        }
    }

    /// Restore a persisted session, refreshing it if it is about to expire
    pub async fn initialize(&self) -> AppResult<AuthState> {
        self.set_loading().await;
        let stored = match self.storage.load().await {
            Ok(stored) => stored,
            Err(e) => {
                warn!(error = %e, "Failed to read persisted session");
                None
            }
        };

        let Some(stored) = stored else {
            self.state.write().await.status = AuthStatus::SignedOut;
            return Ok(self.snapshot().await);
        };

        let Some(session) = self.revalidate(stored).await else {
            self.clear_session().await;
            return Ok(self.snapshot().await);
        };

        self.install_session(&session).await;
        self.refresh_profile(&session.user).await;
        AppLogger::log_auth_event(Some(session.user.id), "restore", true);
        Ok(self.snapshot().await)
    }

    /// Sign in with email and password
    pub async fn sign_in(&self, email: &str, password: &str) -> AppResult<AuthUser> {
        self.set_loading().await;
        let session = match self
            .identity
            .sign_in_with_password(email.trim(), password)
            .await
        {
            Ok(session) => session,
            Err(e) => {
                AppLogger::log_auth_event(None, "sign_in", false);
                self.fail(AuthStatus::SignedOut, &e).await;
                return Err(e);
            }
        };

        self.install_session(&session).await;
        self.refresh_profile(&session.user).await;
        AppLogger::log_auth_event(Some(session.user.id), "sign_in", true);
        Ok(session.user)
    }

    /// Create an account and its profile row
    ///
    /// When the identity service requires email confirmation no session is
    /// returned; the store stays signed out and the profile is created on
    /// first sign-in instead.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> AppResult<AuthUser> {
        self.set_loading().await;
        let display_name = display_name.map(str::trim).filter(|n| !n.is_empty());
        let outcome = match self
            .identity
            .sign_up(email.trim(), password, display_name)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                AppLogger::log_auth_event(None, "sign_up", false);
                self.fail(AuthStatus::SignedOut, &e).await;
                return Err(e);
            }
        };
        AppLogger::log_auth_event(Some(outcome.user.id), "sign_up", true);

        let Some(session) = outcome.session else {
            self.state.write().await.status = AuthStatus::SignedOut;
            return Ok(outcome.user);
        };

        self.install_session(&session).await;
        let new_profile = NewProfile {
            id: session.user.id,
            email: session.user.email.clone().unwrap_or_else(|| email.trim().to_owned()),
            display_name: display_name.map(str::to_owned),
            unit_preference: WeightUnit::default(),
        };
        match self.profiles.create(&new_profile).await {
            Ok(profile) => {
                self.state.write().await.profile = Some(profile);
                Ok(session.user)
            }
            Err(e) => {
                self.fail(AuthStatus::SignedIn, &e).await;
                Err(e)
            }
        }
    }

    /// Sign out locally, revoking the session remotely on a best-effort basis
    pub async fn sign_out(&self) -> AppResult<()> {
        self.stop_refresh_task().await;
        let session = self.state.read().await.session.clone();
        if let Some(session) = session {
            if let Err(e) = self.identity.sign_out(&session.access_token).await {
                warn!(error = %e, "Remote sign-out failed; clearing local session anyway");
            }
            AppLogger::log_auth_event(Some(session.user.id), "sign_out", true);
        }
        self.clear_session().await;
        Ok(())
    }

    /// Refresh the session if it expires within the configured margin
    ///
    /// Returns whether a refresh happened. A rejected refresh token signs the
    /// store out and returns `AuthExpired`.
    pub async fn refresh_if_needed(&self) -> AppResult<bool> {
        let session = self.state.read().await.session.clone();
        let Some(session) = session else {
            return Ok(false);
        };
        if !session.expires_within(self.refresh_margin_secs, Utc::now()) {
            return Ok(false);
        }

        match self.identity.refresh_session(&session.refresh_token).await {
            Ok(fresh) => {
                debug!(user_id = %fresh.user.id, "Session refreshed");
                self.install_session(&fresh).await;
                Ok(true)
            }
            Err(e) if e.code.is_auth() => {
                AppLogger::log_auth_event(Some(session.user.id), "refresh", false);
                self.clear_session().await;
                let expired = AppError::auth_expired();
                self.state.write().await.error = Some(expired.user_message().to_owned());
                Err(expired.with_source(e))
            }
            Err(e) => {
                warn!(error = %e, "Session refresh failed, will retry");
                Err(e)
            }
        }
    }

    /// Edit the signed-in user's profile
    pub async fn update_profile(&self, update: &ProfileUpdate) -> AppResult<Profile> {
        let user_id = self.require_user_id().await?;
        match self.profiles.update(user_id, update).await {
            Ok(profile) => {
                let mut state = self.state.write().await;
                state.profile = Some(profile.clone());
                state.error = None;
                Ok(profile)
            }
            Err(e) => {
                self.state.write().await.error = Some(e.user_message().to_owned());
                Err(e)
            }
        }
    }

    /// React to the app moving between foreground and background
    ///
    /// In the foreground a task checks the session every refresh interval;
    /// moving to the background stops it.
    pub async fn handle_app_state(self: &Arc<Self>, app_state: AppState) {
        match app_state {
            AppState::Foreground => {
                let mut slot = self.refresh_task.lock().await;
                if slot.as_ref().is_some_and(|h| !h.is_finished()) {
                    return;
                }
                *slot = Some(spawn_refresh_loop(Arc::downgrade(self), self.refresh_interval));
                debug!("Background session refresh started");
            }
            AppState::Background => self.stop_refresh_task().await,
        }
    }

    /// Whether the background refresh task is running
    pub async fn is_refreshing_in_background(&self) -> bool {
        self.refresh_task
            .lock()
            .await
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    async fn stop_refresh_task(&self) {
        if let Some(handle) = self.refresh_task.lock().await.take() {
            handle.abort();
            debug!("Background session refresh stopped");
        }
    }
}

impl Drop for AuthStore {
    fn drop(&mut self) {
        if let Some(handle) = self.refresh_task.get_mut().take() {
            handle.abort();
        }
    }
}

/// Periodic refresh holding only a weak reference, so the store can be dropped
fn spawn_refresh_loop(store: Weak<AuthStore>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let Some(store) = store.upgrade() else {
                break;
            };
            match store.refresh_if_needed().await {
                Ok(_) => {}
                Err(e) if e.code.is_auth() => {
                    info!("Session expired, stopping background refresh");
                    break;
                }
                Err(e) => debug!(error = %e, "Background refresh attempt failed"),
            }
        }
    })
}
