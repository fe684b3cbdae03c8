// ABOUTME: Workout session data access: headers, instantiated exercises, and logged sets
// ABOUTME: Also finds previous sets for an exercise and lists completed workouts for history
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gymtrack Contributors

use crate::backend::{BackendExt, Query, SharedBackend};
use crate::constants::collections::{WORKOUTS, WORKOUT_EXERCISES, WORKOUT_SETS};
use crate::errors::{AppError, AppResult};
use crate::models::{
    NewWorkout, NewWorkoutExercise, NewWorkoutSet, SetUpdate, Workout, WorkoutExercise,
    WorkoutSet, WorkoutStatus,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

/// Patch closing a session
#[derive(Debug, Serialize)]
struct StatusPatch {
    status: WorkoutStatus,
    completed_at: Option<DateTime<Utc>>,
}

/// Patch swapping the exercise of a session slot
#[derive(Debug, Serialize)]
struct SwapPatch {
    exercise_id: Uuid,
    is_substitution: bool,
    original_exercise_id: Uuid,
}

/// Minimal projection used by the previous-sets lookup
#[derive(Debug, serde::Deserialize)]
struct SlotRef {
    id: Uuid,
    workout_id: Uuid,
    #[serde(default)]
    order_index: i32,
}

/// Access to `workouts`, `workout_exercises` and `workout_sets`
#[derive(Clone)]
pub struct WorkoutManager {
    backend: SharedBackend,
}

impl WorkoutManager {
    /// Create a manager over `backend`
    #[must_use]
    pub const fn new(backend: SharedBackend) -> Self {
        Self { backend }
    }

    // ------------------------------------------------------------------
    // Workout headers
    // ------------------------------------------------------------------

    /// Insert a session header
    pub async fn create_workout(&self, workout: &NewWorkout) -> AppResult<Workout> {
        self.backend.insert_one(WORKOUTS, workout).await
    }

    /// Delete a session header
    pub async fn delete_workout(&self, workout_id: Uuid) -> AppResult<()> {
        self.backend
            .delete(&Query::table(WORKOUTS).eq("id", workout_id))
            .await?;
        Ok(())
    }

    /// One session header
    pub async fn get_workout(&self, workout_id: Uuid) -> AppResult<Workout> {
        self.backend
            .fetch_one(&Query::table(WORKOUTS).eq("id", workout_id), "Workout")
            .await
    }

    /// Most recently started `in_progress` session of `user_id`
    pub async fn find_in_progress(&self, user_id: Uuid) -> AppResult<Option<Workout>> {
        self.backend
            .fetch_optional(
                &Query::table(WORKOUTS)
                    .eq("user_id", user_id)
                    .eq("status", WorkoutStatus::InProgress)
                    .order("started_at", false),
            )
            .await
    }

    /// Close a session with `status`, stamping `completed_at`
    pub async fn close_workout(
        &self,
        workout_id: Uuid,
        status: WorkoutStatus,
        completed_at: DateTime<Utc>,
    ) -> AppResult<Workout> {
        if !status.is_closed() {
            return Err(AppError::invalid_input(
                "A workout can only be closed as completed or abandoned",
            ));
        }
        let patch = StatusPatch {
            status,
            completed_at: Some(completed_at),
        };
        self.backend
            .patch_one(&Query::table(WORKOUTS).eq("id", workout_id), &patch, "Workout")
            .await
    }

    /// Completed sessions of `user_id`, newest first
    pub async fn completed_workouts(&self, user_id: Uuid, limit: usize) -> AppResult<Vec<Workout>> {
        self.backend
            .fetch(
                &Query::table(WORKOUTS)
                    .eq("user_id", user_id)
                    .eq("status", WorkoutStatus::Completed)
                    .order("completed_at", false)
                    .limit(limit),
            )
            .await
    }

    // ------------------------------------------------------------------
    // Session slots
    // ------------------------------------------------------------------

    /// Insert session slots
    pub async fn create_exercises(
        &self,
        exercises: &[NewWorkoutExercise],
    ) -> AppResult<Vec<WorkoutExercise>> {
        let mut created: Vec<WorkoutExercise> =
            self.backend.insert_many(WORKOUT_EXERCISES, exercises).await?;
        created.sort_by_key(|e| e.order_index);
        Ok(created)
    }

    /// Slots of a session ordered by `order_index`
    pub async fn exercises_for_workout(&self, workout_id: Uuid) -> AppResult<Vec<WorkoutExercise>> {
        self.backend
            .fetch(
                &Query::table(WORKOUT_EXERCISES)
                    .eq("workout_id", workout_id)
                    .order("order_index", true),
            )
            .await
    }

    /// Slots of several sessions, ordered by session then `order_index`
    pub async fn exercises_for_workouts(&self, workout_ids: &[Uuid]) -> AppResult<Vec<WorkoutExercise>> {
        self.backend
            .fetch(
                &Query::table(WORKOUT_EXERCISES)
                    .in_list("workout_id", workout_ids)
                    .order("workout_id", true)
                    .order("order_index", true),
            )
            .await
    }

    /// One session slot
    pub async fn get_exercise(&self, workout_exercise_id: Uuid) -> AppResult<WorkoutExercise> {
        self.backend
            .fetch_one(
                &Query::table(WORKOUT_EXERCISES).eq("id", workout_exercise_id),
                "Workout exercise",
            )
            .await
    }

    /// Replace the exercise of a slot in place
    ///
    /// `original_exercise_id` is the exercise the slot was seeded with; it is
    /// kept across repeated swaps.
    pub async fn swap_exercise(
        &self,
        workout_exercise_id: Uuid,
        new_exercise_id: Uuid,
        original_exercise_id: Uuid,
    ) -> AppResult<WorkoutExercise> {
        let patch = SwapPatch {
            exercise_id: new_exercise_id,
            is_substitution: new_exercise_id != original_exercise_id,
            original_exercise_id,
        };
        self.backend
            .patch_one(
                &Query::table(WORKOUT_EXERCISES).eq("id", workout_exercise_id),
                &patch,
                "Workout exercise",
            )
            .await
    }

    // ------------------------------------------------------------------
    // Sets
    // ------------------------------------------------------------------

    /// Sets of the given slots, ordered by slot then `set_number`
    pub async fn sets_for_exercises(&self, workout_exercise_ids: &[Uuid]) -> AppResult<Vec<WorkoutSet>> {
        self.backend
            .fetch(
                &Query::table(WORKOUT_SETS)
                    .in_list("workout_exercise_id", workout_exercise_ids)
                    .order("workout_exercise_id", true)
                    .order("set_number", true),
            )
            .await
    }

    /// Insert one set
    pub async fn insert_set(&self, set: &NewWorkoutSet) -> AppResult<WorkoutSet> {
        self.backend.insert_one(WORKOUT_SETS, set).await
    }

    /// Patch one set
    pub async fn update_set(&self, set_id: Uuid, update: &SetUpdate) -> AppResult<WorkoutSet> {
        self.backend
            .patch_one(&Query::table(WORKOUT_SETS).eq("id", set_id), update, "Set")
            .await
    }

    /// Delete one set; fails with `ResourceNotFound` if nothing was deleted
    pub async fn delete_set(&self, set_id: Uuid) -> AppResult<()> {
        let removed = self
            .backend
            .delete(&Query::table(WORKOUT_SETS).eq("id", set_id))
            .await?;
        if removed.is_empty() {
            return Err(AppError::not_found("Set").with_resource_id(set_id.to_string()));
        }
        Ok(())
    }

    /// Delete every set of a slot, returning how many were removed
    pub async fn delete_sets_for_exercise(&self, workout_exercise_id: Uuid) -> AppResult<usize> {
        let removed = self
            .backend
            .delete(&Query::table(WORKOUT_SETS).eq("workout_exercise_id", workout_exercise_id))
            .await?;
        Ok(removed.len())
    }

    /// Working sets of `exercise_id` from the user's most recently completed workout containing it
    ///
    /// Ordered by `set_number`. Empty when the exercise was never completed.
    pub async fn previous_sets(&self, user_id: Uuid, exercise_id: Uuid) -> AppResult<Vec<WorkoutSet>> {
        let slots: Vec<SlotRef> = self
            .backend
            .fetch(&Query::table(WORKOUT_EXERCISES).eq("exercise_id", exercise_id))
            .await?;
        if slots.is_empty() {
            return Ok(Vec::new());
        }

        let workout_ids: Vec<Uuid> = slots.iter().map(|s| s.workout_id).collect();
        let latest: Option<Workout> = self
            .backend
            .fetch_optional(
                &Query::table(WORKOUTS)
                    .in_list("id", &workout_ids)
                    .eq("user_id", user_id)
                    .eq("status", WorkoutStatus::Completed)
                    .order("completed_at", false),
            )
            .await?;
        let Some(latest) = latest else {
            return Ok(Vec::new());
        };

        // First slot of the exercise in that workout
        let Some(slot) = slots
            .iter()
            .filter(|s| s.workout_id == latest.id)
            .min_by_key(|s| s.order_index)
        else {
            return Ok(Vec::new());
        };
        debug!(%exercise_id, workout_id = %latest.id, "Found previous workout for exercise");

        self.backend
            .fetch(
                &Query::table(WORKOUT_SETS)
                    .eq("workout_exercise_id", slot.id)
                    .eq("is_warmup", false)
                    .order("set_number", true),
            )
            .await
    }
}
