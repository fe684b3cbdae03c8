// ABOUTME: Active-workout view-model: session lifecycle, set logging, edits, deletes, and swaps
// ABOUTME: Applies backend results to local state only while the session generation is current
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gymtrack Contributors

//! # Active Workout Session
//!
//! [`ActiveWorkoutStore`] owns the in-memory copy of one workout session and
//! drives it through `Idle -> Loading -> Active -> Completed | Abandoned`.
//! Every mutation is one backend round trip first; local state is patched
//! from the returned record afterwards.
//!
//! ## Stale results
//!
//! Starting, resuming, completing, abandoning and detaching bump a
//! generation counter. An operation captures the generation when it starts
//! and its result is only applied if the counter is unchanged when it
//! returns; otherwise it fails with `StaleResult`.
//!
//! The state lock is never held across a backend call. Set mutations are
//! serialized by a separate lock so concurrent `log_set` calls cannot pick
//! the same `set_number`.

use crate::config::SwapPolicy;
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::models::{
    Exercise, NewWorkout, NewWorkoutExercise, NewWorkoutSet, SetData, SetUpdate, Workout,
    WorkoutExercise, WorkoutSet, WorkoutStatus,
};
use crate::workout::stats::WorkoutStats;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// Lifecycle phase of the session view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// No session loaded
    #[default]
    Idle,
    /// Start or resume in flight
    Loading,
    /// Session loaded and accepting sets
    Active,
    /// Last session finished normally
    Completed,
    /// Last session given up
    Abandoned,
}

impl SessionPhase {
    /// Whether a new session may be started or resumed from this phase
    #[must_use]
    pub const fn can_open(self) -> bool {
        matches!(self, Self::Idle | Self::Completed | Self::Abandoned)
    }
}

/// One exercise slot of the session with its catalog entry and logged sets
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveExercise {
    /// Slot row
    pub workout_exercise: WorkoutExercise,
    /// Catalog entry of the current exercise, if it could be loaded
    pub exercise: Option<Exercise>,
    /// Logged sets ordered by `set_number`
    pub sets: Vec<WorkoutSet>,
    /// Highest `set_number` among stored sets a swap hid from `sets`
    ///
    /// Visible sets are numbered after it so numbers stay unique in the slot.
    pub hidden_through: u32,
}

impl ActiveExercise {
    /// Slot id
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.workout_exercise.id
    }

    /// Exercise name for display
    #[must_use]
    pub fn name(&self) -> &str {
        self.exercise
            .as_ref()
            .map_or("Unknown exercise", |e| e.name.as_str())
    }

    /// Non-warmup sets
    pub fn working_sets(&self) -> impl Iterator<Item = &WorkoutSet> {
        self.sets.iter().filter(|s| s.is_working())
    }

    /// `set_number` of the visible set at `index`
    #[must_use]
    pub fn set_number_at(&self, index: usize) -> u32 {
        let offset = u32::try_from(index).unwrap_or(u32::MAX - 1);
        self.hidden_through.saturating_add(offset).saturating_add(1)
    }

    /// `set_number` the next logged set receives
    #[must_use]
    pub fn next_set_number(&self) -> u32 {
        self.set_number_at(self.sets.len())
    }

    /// Highest `set_number` stored for this slot, hidden or visible
    #[must_use]
    pub fn highest_set_number(&self) -> u32 {
        self.sets
            .iter()
            .map(|s| s.set_number)
            .max()
            .unwrap_or(0)
            .max(self.hidden_through)
    }

    /// Rest between sets for this slot, or `default_secs`
    #[must_use]
    pub fn rest_secs(&self, default_secs: u64) -> u64 {
        self.workout_exercise
            .rest_seconds
            .map_or(default_secs, u64::from)
    }
}

/// Snapshot of the session view
#[derive(Debug, Clone, Default)]
pub struct WorkoutState {
    /// Lifecycle phase
    pub phase: SessionPhase,
    /// Session header while loaded
    pub workout: Option<Workout>,
    /// Slots ordered by `order_index`
    pub exercises: Vec<ActiveExercise>,
    /// Last failure, as shown to the user
    pub error: Option<String>,
}

impl WorkoutState {
    /// Slot by id
    #[must_use]
    pub fn exercise(&self, workout_exercise_id: Uuid) -> Option<&ActiveExercise> {
        self.exercises.iter().find(|e| e.id() == workout_exercise_id)
    }

    fn exercise_mut(&mut self, workout_exercise_id: Uuid) -> Option<&mut ActiveExercise> {
        self.exercises
            .iter_mut()
            .find(|e| e.id() == workout_exercise_id)
    }

    /// Slot holding the set `set_id`
    fn slot_of_set(&self, set_id: Uuid) -> Option<Uuid> {
        self.exercises
            .iter()
            .find(|e| e.sets.iter().any(|s| s.id == set_id))
            .map(ActiveExercise::id)
    }

    /// Totals over the loaded sets; duration runs from `started_at` to now
    #[must_use]
    pub fn stats(&self) -> WorkoutStats {
        let duration = self
            .workout
            .as_ref()
            .map_or(0, |w| w.duration_secs(Utc::now()));
        WorkoutStats::from_groups(self.exercises.iter().map(|e| e.sets.as_slice()), duration)
    }
}

/// Join slots with catalog entries and their sets
pub(crate) fn assemble_exercises(
    slots: Vec<WorkoutExercise>,
    catalog: &HashMap<Uuid, Exercise>,
    sets: Vec<WorkoutSet>,
) -> Vec<ActiveExercise> {
    let mut by_slot: HashMap<Uuid, Vec<WorkoutSet>> = HashMap::new();
    for set in sets {
        by_slot.entry(set.workout_exercise_id).or_default().push(set);
    }
    slots
        .into_iter()
        .map(|slot| {
            let mut sets = by_slot.remove(&slot.id).unwrap_or_default();
            sets.sort_by_key(|s| s.set_number);
            ActiveExercise {
                exercise: catalog.get(&slot.exercise_id).cloned(),
                workout_exercise: slot,
                sets,
                hidden_through: 0,
            }
        })
        .collect()
}

/// Slots of a session with catalog entries and sets
pub(crate) async fn load_exercises(db: &Database, workout_id: Uuid) -> AppResult<Vec<ActiveExercise>> {
    let slots = db.workouts.exercises_for_workout(workout_id).await?;
    let exercise_ids: Vec<Uuid> = slots.iter().map(|s| s.exercise_id).collect();
    let slot_ids: Vec<Uuid> = slots.iter().map(|s| s.id).collect();
    let catalog = db.exercises.get_many(&exercise_ids).await?;
    let sets = db.workouts.sets_for_exercises(&slot_ids).await?;
    Ok(assemble_exercises(slots, &catalog, sets))
}

/// Basic sanity checks on entered values
fn validate_values(weight: Option<f64>, rpe: Option<f64>) -> AppResult<()> {
    if let Some(weight) = weight {
        if !weight.is_finite() || weight < 0.0 {
            return Err(AppError::invalid_input("Weight must be zero or more"));
        }
    }
    if let Some(rpe) = rpe {
        if !(1.0..=10.0).contains(&rpe) {
            return Err(AppError::invalid_input("RPE must be between 1 and 10"));
        }
    }
    Ok(())
}

fn validate_set(data: &SetData) -> AppResult<()> {
    validate_values(data.weight, data.rpe)
}

/// Edits may change values only; positions are owned by the store
fn validate_update(update: &SetUpdate) -> AppResult<()> {
    if update.set_number.is_some() {
        return Err(AppError::invalid_input(
            "Set numbers are assigned by the workout and cannot be edited",
        ));
    }
    validate_values(update.new_weight(), update.new_rpe())
}

/// View-model for one user's active workout
pub struct ActiveWorkoutStore {
    db: Database,
    user_id: Uuid,
    swap_policy: SwapPolicy,
    state: RwLock<WorkoutState>,
    generation: AtomicU64,
    set_ops: Mutex<()>,
}

impl ActiveWorkoutStore {
    /// Idle store for `user_id`
    #[must_use]
    pub fn new(db: Database, user_id: Uuid, swap_policy: SwapPolicy) -> Self {
        Self {
            db,
            user_id,
            swap_policy,
            state: RwLock::new(WorkoutState::default()),
            generation: AtomicU64::new(0),
            set_ops: Mutex::new(()),
        }
    }

    /// User the store acts for
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.user_id
    }

    /// Current state
    pub async fn snapshot(&self) -> WorkoutState {
        self.state.read().await.clone()
    }

    /// Current phase
    pub async fn phase(&self) -> SessionPhase {
        self.state.read().await.phase
    }

    /// Id of the loaded session
    pub async fn workout_id(&self) -> Option<Uuid> {
        self.state.read().await.workout.as_ref().map(|w| w.id)
    }

    /// Current generation
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    // ------------------------------------------------------------------
    // Generation bookkeeping (all under the state write lock)
    // ------------------------------------------------------------------

    /// Enter `Loading` from an openable phase, returning the new generation and prior phase
    async fn begin_open(&self) -> AppResult<(u64, SessionPhase)> {
        let mut state = self.state.write().await;
        if !state.phase.can_open() {
            let error = match state.phase {
                SessionPhase::Loading => AppError::invalid_state("A workout is already loading"),
                _ => AppError::invalid_state("A workout is already in progress"),
            };
            state.error = Some(error.user_message().to_owned());
            return Err(error);
        }
        let prior = state.phase;
        state.phase = SessionPhase::Loading;
        state.error = None;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        Ok((generation, prior))
    }

    /// Restore the prior phase after a failed open or close
    async fn fail_transition(&self, generation: u64, prior: SessionPhase, error: &AppError) {
        let mut state = self.state.write().await;
        if self.generation() == generation {
            state.phase = prior;
            state.error = Some(error.user_message().to_owned());
        }
    }

    /// Require `Active`, returning the generation to check results against
    async fn require_active(&self) -> AppResult<u64> {
        let state = self.state.read().await;
        if state.phase == SessionPhase::Active {
            Ok(self.generation())
        } else {
            Err(AppError::invalid_state("No workout in progress"))
        }
    }

    async fn record_error(&self, generation: u64, error: &AppError) {
        let mut state = self.state.write().await;
        if self.generation() == generation {
            state.error = Some(error.user_message().to_owned());
        }
    }

    /// Record a failure and hand it back for `?`-style returns
    async fn failed<T>(&self, generation: u64, error: AppError) -> AppResult<T> {
        self.record_error(generation, &error).await;
        Err(error)
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Start a session from a template
    ///
    /// Inserts the header, then one slot per template exercise with its
    /// targets. If the slots cannot be inserted the header is deleted again
    /// on a best-effort basis and the original error is returned.
    #[instrument(skip(self), fields(user_id = %self.user_id))]
    pub async fn start_workout(&self, template_id: Uuid) -> AppResult<Workout> {
        let (generation, prior) = self.begin_open().await?;
        match self.create_session(template_id).await {
            Ok((workout, exercises)) => {
                let mut state = self.state.write().await;
                if self.generation() != generation {
                    return Err(AppError::stale_result().with_resource_id(workout.id.to_string()));
                }
                state.phase = SessionPhase::Active;
                state.workout = Some(workout.clone());
                state.exercises = exercises;
                drop(state);
                AppLogger::log_session_event(self.user_id, workout.id, "start");
                Ok(workout)
            }
            Err(e) => {
                self.fail_transition(generation, prior, &e).await;
                Err(e)
            }
        }
    }

    async fn create_session(&self, template_id: Uuid) -> AppResult<(Workout, Vec<ActiveExercise>)> {
        let template = self.db.templates.get_with_exercises(template_id).await?;
        let workout = self
            .db
            .workouts
            .create_workout(&NewWorkout {
                user_id: self.user_id,
                template_id: Some(template_id),
                name: template.template.name.clone(),
                status: WorkoutStatus::InProgress,
                started_at: Utc::now(),
            })
            .await?;

        let mut details = template.exercises;
        details.sort_by_key(|d| d.target.order_index);
        let payloads: Vec<NewWorkoutExercise> = details
            .iter()
            .map(|d| NewWorkoutExercise::from_template(workout.id, &d.target))
            .collect();

        let slots = match self.db.workouts.create_exercises(&payloads).await {
            Ok(slots) => slots,
            Err(e) => {
                if let Err(cleanup) = self.db.workouts.delete_workout(workout.id).await {
                    warn!(
                        workout_id = %workout.id,
                        error = %cleanup,
                        "Failed to remove workout after exercise insert failed"
                    );
                }
                return Err(e);
            }
        };

        let catalog: HashMap<Uuid, Exercise> = details
            .into_iter()
            .filter_map(|d| d.exercise)
            .map(|e| (e.id, e))
            .collect();
        Ok((workout, assemble_exercises(slots, &catalog, Vec::new())))
    }

    /// Reload an in-progress session with its slots and sets
    #[instrument(skip(self), fields(user_id = %self.user_id))]
    pub async fn resume_workout(&self, workout_id: Uuid) -> AppResult<Workout> {
        let (generation, prior) = self.begin_open().await?;
        let loaded = async {
            let workout = self.db.workouts.get_workout(workout_id).await?;
            if workout.user_id != self.user_id {
                return Err(AppError::not_found("Workout")
                    .with_resource_id(workout_id.to_string())
                    .with_user_id(self.user_id));
            }
            if workout.status != WorkoutStatus::InProgress {
                return Err(AppError::invalid_state(format!(
                    "Workout is already {}",
                    workout.status
                )));
            }
            let exercises = load_exercises(&self.db, workout_id).await?;
            Ok((workout, exercises))
        }
        .await;

        match loaded {
            Ok((workout, exercises)) => {
                let mut state = self.state.write().await;
                if self.generation() != generation {
                    return Err(AppError::stale_result());
                }
                state.phase = SessionPhase::Active;
                state.workout = Some(workout.clone());
                state.exercises = exercises;
                drop(state);
                AppLogger::log_session_event(self.user_id, workout.id, "resume");
                Ok(workout)
            }
            Err(e) => {
                self.fail_transition(generation, prior, &e).await;
                Err(e)
            }
        }
    }

    /// Finish the session normally
    pub async fn complete_workout(&self) -> AppResult<Workout> {
        self.close(WorkoutStatus::Completed).await
    }

    /// Give up the session
    pub async fn abandon_workout(&self) -> AppResult<Workout> {
        self.close(WorkoutStatus::Abandoned).await
    }

    #[instrument(skip(self), fields(user_id = %self.user_id))]
    async fn close(&self, status: WorkoutStatus) -> AppResult<Workout> {
        let (generation, workout_id) = {
            let mut state = self.state.write().await;
            let workout_id = match (&state.phase, &state.workout) {
                (SessionPhase::Active, Some(workout)) => workout.id,
                _ => return Err(AppError::invalid_state("No workout in progress")),
            };
            state.phase = SessionPhase::Loading;
            state.error = None;
            (self.generation.fetch_add(1, Ordering::SeqCst) + 1, workout_id)
        };

        match self
            .db
            .workouts
            .close_workout(workout_id, status, Utc::now())
            .await
        {
            Ok(workout) => {
                let mut state = self.state.write().await;
                if self.generation() != generation {
                    return Err(AppError::stale_result());
                }
                *state = WorkoutState {
                    phase: if status == WorkoutStatus::Completed {
                        SessionPhase::Completed
                    } else {
                        SessionPhase::Abandoned
                    },
                    ..WorkoutState::default()
                };
                drop(state);
                AppLogger::log_session_event(self.user_id, workout.id, status.as_str());
                Ok(workout)
            }
            Err(e) => {
                self.fail_transition(generation, SessionPhase::Active, &e).await;
                Err(e)
            }
        }
    }

    /// Drop the local session without touching the backend
    ///
    /// In-flight results are discarded. The session stays `in_progress`
    /// remotely and can be resumed later.
    pub async fn detach(&self) {
        let mut state = self.state.write().await;
        self.generation.fetch_add(1, Ordering::SeqCst);
        *state = WorkoutState::default();
        debug!(user_id = %self.user_id, "Detached from workout session");
    }

    // ------------------------------------------------------------------
    // Sets
    // ------------------------------------------------------------------

    /// Log a set on a slot, numbered after the sets already held locally
    #[instrument(skip(self, data), fields(user_id = %self.user_id))]
    pub async fn log_set(&self, workout_exercise_id: Uuid, data: SetData) -> AppResult<WorkoutSet> {
        let _guard = self.set_ops.lock().await;
        let generation = self.require_active().await?;
        if let Err(e) = validate_set(&data) {
            return self.failed(generation, e).await;
        }

        let next = self
            .state
            .read()
            .await
            .exercise(workout_exercise_id)
            .map(ActiveExercise::next_set_number);
        let Some(set_number) = next else {
            let error = AppError::not_found("Workout exercise")
                .with_resource_id(workout_exercise_id.to_string());
            return self.failed(generation, error).await;
        };

        let payload = NewWorkoutSet {
            workout_exercise_id,
            set_number,
            data,
        };
        let record = match self.db.workouts.insert_set(&payload).await {
            Ok(record) => record,
            Err(e) => return self.failed(generation, e).await,
        };

        let mut state = self.state.write().await;
        if self.generation() != generation {
            return Err(AppError::stale_result().with_resource_id(record.id.to_string()));
        }
        if let Some(slot) = state.exercise_mut(workout_exercise_id) {
            slot.sets.push(record.clone());
        }
        state.error = None;
        Ok(record)
    }

    /// Edit the values of a logged set
    ///
    /// The update is checked like a new set; `set_number` is rejected.
    #[instrument(skip(self, update), fields(user_id = %self.user_id))]
    pub async fn update_set(&self, set_id: Uuid, update: &SetUpdate) -> AppResult<WorkoutSet> {
        let _guard = self.set_ops.lock().await;
        let generation = self.require_active().await?;
        if let Err(e) = validate_update(update) {
            return self.failed(generation, e).await;
        }
        let slot_id = self.state.read().await.slot_of_set(set_id);
        if slot_id.is_none() {
            let error = AppError::not_found("Set").with_resource_id(set_id.to_string());
            return self.failed(generation, error).await;
        }

        let record = match self.db.workouts.update_set(set_id, update).await {
            Ok(record) => record,
            Err(e) => return self.failed(generation, e).await,
        };

        let mut state = self.state.write().await;
        if self.generation() != generation {
            return Err(AppError::stale_result());
        }
        if let Some(local) = state
            .exercises
            .iter_mut()
            .flat_map(|e| e.sets.iter_mut())
            .find(|s| s.id == set_id)
        {
            *local = record.clone();
        }
        state.error = None;
        Ok(record)
    }

    /// Delete a logged set and renumber the slot's remaining sets densely
    ///
    /// Visible sets are numbered from 1, or from just after the sets a
    /// swap hid when the slot kept them.
    ///
    /// Changed numbers are written back one set at a time in ascending order.
    /// The local list is renumbered even if one of those writes fails; the
    /// first failure is returned.
    #[instrument(skip(self), fields(user_id = %self.user_id))]
    pub async fn delete_set(&self, set_id: Uuid) -> AppResult<()> {
        let _guard = self.set_ops.lock().await;
        let generation = self.require_active().await?;
        let slot_id = self.state.read().await.slot_of_set(set_id);
        let Some(slot_id) = slot_id else {
            let error = AppError::not_found("Set").with_resource_id(set_id.to_string());
            return self.failed(generation, error).await;
        };

        if let Err(e) = self.db.workouts.delete_set(set_id).await {
            return self.failed(generation, e).await;
        }

        // Remove locally and compute the moves
        let moves: Vec<(Uuid, u32)> = {
            let mut state = self.state.write().await;
            if self.generation() != generation {
                return Err(AppError::stale_result());
            }
            let Some(slot) = state.exercise_mut(slot_id) else {
                return Ok(());
            };
            slot.sets.retain(|s| s.id != set_id);
            slot.sets.sort_by_key(|s| s.set_number);
            let mut moves = Vec::new();
            let numbers: Vec<u32> = (0..slot.sets.len())
                .map(|i| slot.set_number_at(i))
                .collect();
            for (set, dense) in slot.sets.iter_mut().zip(numbers) {
                if set.set_number != dense {
                    set.set_number = dense;
                    moves.push((set.id, dense));
                }
            }
            state.error = None;
            moves
        };

        let mut first_error = None;
        for (id, number) in moves {
            if let Err(e) = self
                .db
                .workouts
                .update_set(id, &SetUpdate::renumber(number))
                .await
            {
                warn!(set_id = %id, set_number = number, error = %e, "Failed to persist renumbered set");
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => self.failed(generation, e).await,
            None => Ok(()),
        }
    }

    // ------------------------------------------------------------------
    // Exercises
    // ------------------------------------------------------------------

    /// Replace a slot's exercise in place and clear its visible sets
    ///
    /// With [`SwapPolicy::DeleteSets`] the slot's stored sets are deleted
    /// first; with [`SwapPolicy::KeepSets`] they stay in storage and sets
    /// logged afterwards are numbered after them.
    #[instrument(skip(self), fields(user_id = %self.user_id))]
    pub async fn swap_exercise(
        &self,
        workout_exercise_id: Uuid,
        new_exercise_id: Uuid,
    ) -> AppResult<ActiveExercise> {
        let _guard = self.set_ops.lock().await;
        let generation = self.require_active().await?;
        let slot = self
            .state
            .read()
            .await
            .exercise(workout_exercise_id)
            .map(|e| e.workout_exercise.clone());
        let Some(slot) = slot else {
            let error = AppError::not_found("Workout exercise")
                .with_resource_id(workout_exercise_id.to_string());
            return self.failed(generation, error).await;
        };
        if slot.exercise_id == new_exercise_id {
            let error = AppError::invalid_input("That exercise is already in this slot");
            return self.failed(generation, error).await;
        }
        let original = slot.original_exercise_id.unwrap_or(slot.exercise_id);

        let swapped = async {
            let exercise = self.db.exercises.get(new_exercise_id).await?;
            if self.swap_policy == SwapPolicy::DeleteSets {
                let removed = self
                    .db
                    .workouts
                    .delete_sets_for_exercise(workout_exercise_id)
                    .await?;
                debug!(removed, "Deleted sets of swapped exercise");
            }
            let row = self
                .db
                .workouts
                .swap_exercise(workout_exercise_id, new_exercise_id, original)
                .await?;
            Ok::<_, AppError>((row, exercise))
        }
        .await;
        let (row, exercise) = match swapped {
            Ok(result) => result,
            Err(e) => return self.failed(generation, e).await,
        };

        let mut state = self.state.write().await;
        if self.generation() != generation {
            return Err(AppError::stale_result());
        }
        let Some(local) = state.exercise_mut(workout_exercise_id) else {
            return Err(AppError::not_found("Workout exercise"));
        };
        local.hidden_through = match self.swap_policy {
            SwapPolicy::KeepSets => local.highest_set_number(),
            SwapPolicy::DeleteSets => 0,
        };
        local.workout_exercise = row;
        local.exercise = Some(exercise);
        local.sets.clear();
        let updated = local.clone();
        state.error = None;
        Ok(updated)
    }

    /// Working sets of `exercise_id` from the user's last completed workout containing it
    pub async fn get_previous_sets(&self, exercise_id: Uuid) -> AppResult<Vec<WorkoutSet>> {
        self.db
            .workouts
            .previous_sets(self.user_id, exercise_id)
            .await
    }

    /// Totals over the sets held locally
    pub async fn workout_stats(&self) -> WorkoutStats {
        self.state.read().await.stats()
    }
}
