// ABOUTME: Top-level client wiring the backend, identity service, session storage, and stores
// ABOUTME: Entry point for applications and the CLI; hands out workout stores for the signed-in user
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gymtrack Contributors

use crate::auth::{AuthStore, FileSessionStorage, RestIdentity, SessionStorage, SharedIdentity};
use crate::backend::http_client::initialize_shared_client;
use crate::backend::{AuthToken, RestBackend, SharedBackend};
use crate::config::{ClientConfig, SwapPolicy};
use crate::database::{Database, ExerciseManager, TemplateManager};
use crate::errors::AppResult;
use crate::models::Workout;
use crate::workout::{
    self, ActiveExercise, ActiveWorkoutStore, CompletionSignal, HistoryEntry, RestTimerEvent,
    RestTimerHandle, WorkoutSummary,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;
use uuid::Uuid;

/// Everything an app needs, built once at startup
pub struct GymtrackClient {
    database: Database,
    auth: Arc<AuthStore>,
    swap_policy: SwapPolicy,
    default_rest_secs: u64,
}

impl GymtrackClient {
    /// Connect to the hosted backend described by `config`
    ///
    /// No request is made yet; call `auth().initialize()` to restore a
    /// persisted session.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the backend URL is invalid
    pub fn connect(config: &ClientConfig) -> AppResult<Self> {
        initialize_shared_client(
            config.http_timeout.as_secs(),
            config.connect_timeout.as_secs(),
        );
        let token = AuthToken::new();
        let backend: SharedBackend = Arc::new(RestBackend::new(
            &config.backend_url,
            config.anon_key.clone(),
            token.clone(),
        )?);
        let identity: SharedIdentity =
            Arc::new(RestIdentity::new(&config.backend_url, config.anon_key.clone())?);
        let storage: Arc<dyn SessionStorage> =
            Arc::new(FileSessionStorage::new(config.session_file.clone()));

        info!(config = %config.summary(), "Gymtrack client configured");
        Ok(Self::from_parts(backend, identity, storage, token, config))
    }

    /// Assemble a client from explicit parts (in-memory backends, tests)
    #[must_use]
    pub fn from_parts(
        backend: SharedBackend,
        identity: SharedIdentity,
        storage: Arc<dyn SessionStorage>,
        token: AuthToken,
        config: &ClientConfig,
    ) -> Self {
        let database = Database::new(backend);
        let auth = AuthStore::new(identity, storage, database.profiles.clone(), token)
            .with_refresh_timing(config.refresh_margin_secs, config.refresh_interval);
        Self {
            database,
            auth: Arc::new(auth),
            swap_policy: config.swap_policy,
            default_rest_secs: config.default_rest_secs,
        }
    }

    /// Authentication state container
    #[must_use]
    pub fn auth(&self) -> &Arc<AuthStore> {
        &self.auth
    }

    /// All data managers
    #[must_use]
    pub const fn database(&self) -> &Database {
        &self.database
    }

    /// Template access
    #[must_use]
    pub const fn templates(&self) -> &TemplateManager {
        &self.database.templates
    }

    /// Exercise catalog access
    #[must_use]
    pub const fn exercises(&self) -> &ExerciseManager {
        &self.database.exercises
    }

    /// Rest duration used when a slot has none
    #[must_use]
    pub const fn default_rest_secs(&self) -> u64 {
        self.default_rest_secs
    }

    /// A fresh, idle workout store for the signed-in user
    ///
    /// # Errors
    ///
    /// Returns `AuthRequired` when signed out
    pub async fn workout_store(&self) -> AppResult<ActiveWorkoutStore> {
        let user_id = self.auth.require_user_id().await?;
        Ok(ActiveWorkoutStore::new(
            self.database.clone(),
            user_id,
            self.swap_policy,
        ))
    }

    /// The signed-in user's unfinished session, for a resume prompt
    pub async fn find_in_progress(&self) -> AppResult<Option<Workout>> {
        let user_id = self.auth.require_user_id().await?;
        self.database.workouts.find_in_progress(user_id).await
    }

    /// Summary of a finished session
    pub async fn summary(&self, workout_id: Uuid) -> AppResult<WorkoutSummary> {
        WorkoutSummary::load(&self.database, workout_id).await
    }

    /// The signed-in user's completed sessions, newest first
    pub async fn history(&self, limit: usize) -> AppResult<Vec<HistoryEntry>> {
        let user_id = self.auth.require_user_id().await?;
        workout::history(&self.database, user_id, limit).await
    }

    /// Start the rest countdown for `slot`
    #[must_use]
    pub fn start_rest(
        &self,
        slot: &ActiveExercise,
        on_complete: Option<Arc<dyn CompletionSignal>>,
    ) -> (RestTimerHandle, mpsc::UnboundedReceiver<RestTimerEvent>) {
        RestTimerHandle::start(slot.rest_secs(self.default_rest_secs), on_complete)
    }
}
