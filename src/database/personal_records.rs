// ABOUTME: Read access to backend-computed personal records
// ABOUTME: Records per workout for summaries and best record per exercise
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gymtrack Contributors

use crate::backend::{BackendExt, Query, SharedBackend};
use crate::constants::collections::PERSONAL_RECORDS;
use crate::errors::AppResult;
use crate::models::PersonalRecord;
use tracing::warn;
use uuid::Uuid;

/// Access to the `personal_records` collection
#[derive(Clone)]
pub struct PersonalRecordManager {
    backend: SharedBackend,
}

impl PersonalRecordManager {
    /// Create a manager over `backend`
    #[must_use]
    pub const fn new(backend: SharedBackend) -> Self {
        Self { backend }
    }

    /// Records achieved during `workout_id`
    pub async fn for_workout(&self, workout_id: Uuid) -> AppResult<Vec<PersonalRecord>> {
        self.backend
            .fetch(
                &Query::table(PERSONAL_RECORDS)
                    .eq("workout_id", workout_id)
                    .order("achieved_at", true),
            )
            .await
    }

    /// Records achieved during `workout_id`, or none if the fetch fails
    pub async fn for_workout_or_empty(&self, workout_id: Uuid) -> Vec<PersonalRecord> {
        self.for_workout(workout_id).await.unwrap_or_else(|e| {
            warn!(%workout_id, error = %e, "Failed to load personal records");
            Vec::new()
        })
    }

    /// Heaviest record of `user_id` on `exercise_id`
    pub async fn best_for_exercise(
        &self,
        user_id: Uuid,
        exercise_id: Uuid,
    ) -> AppResult<Option<PersonalRecord>> {
        self.backend
            .fetch_optional(
                &Query::table(PERSONAL_RECORDS)
                    .eq("user_id", user_id)
                    .eq("exercise_id", exercise_id)
                    .order("weight", false)
                    .order("reps", false),
            )
            .await
    }

    /// Every record of `user_id`, newest first
    pub async fn for_user(&self, user_id: Uuid) -> AppResult<Vec<PersonalRecord>> {
        self.backend
            .fetch(
                &Query::table(PERSONAL_RECORDS)
                    .eq("user_id", user_id)
                    .order("achieved_at", false),
            )
            .await
    }
}
