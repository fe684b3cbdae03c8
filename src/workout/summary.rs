// ABOUTME: Post-workout summary and completed-workout history
// ABOUTME: Per-exercise breakdowns with best set by estimated 1RM, totals, and records achieved
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gymtrack Contributors

use crate::database::Database;
use crate::errors::AppResult;
use crate::models::{estimate_one_rep_max, PersonalRecord, Workout, WorkoutSet};
use crate::workout::session::{assemble_exercises, load_exercises, ActiveExercise};
use crate::workout::stats::WorkoutStats;
use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use tracing::instrument;
use uuid::Uuid;

/// One exercise of a finished session
#[derive(Debug, Clone, Serialize)]
pub struct ExerciseBreakdown {
    /// Slot id
    pub workout_exercise_id: Uuid,
    /// Exercise name
    pub name: String,
    /// Whether the slot was swapped away from its template exercise
    pub is_substitution: bool,
    /// Working sets logged
    pub working_sets: usize,
    /// Volume over working sets, rounded
    pub volume: u64,
    /// Working set with the highest estimated one-rep max
    pub best_set: Option<WorkoutSet>,
    /// Every logged set, warmups included
    pub sets: Vec<WorkoutSet>,
}

impl ExerciseBreakdown {
    fn from_exercise(exercise: ActiveExercise) -> Self {
        let stats = WorkoutStats::from_groups([exercise.sets.as_slice()], 0);
        let best_set = exercise
            .working_sets()
            .filter_map(|s| match (s.data.weight, s.data.reps) {
                (Some(w), Some(r)) if r > 0 => Some((estimate_one_rep_max(w, r), s)),
                _ => None,
            })
            .max_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, s)| s.clone());
        Self {
            workout_exercise_id: exercise.id(),
            name: exercise.name().to_owned(),
            is_substitution: exercise.workout_exercise.is_substitution,
            working_sets: stats.total_sets,
            volume: stats.total_volume,
            best_set,
            sets: exercise.sets,
        }
    }
}

/// Everything shown after a session ends
#[derive(Debug, Clone, Serialize)]
pub struct WorkoutSummary {
    /// Session header
    pub workout: Workout,
    /// Exercises in slot order
    pub exercises: Vec<ExerciseBreakdown>,
    /// Session totals
    pub stats: WorkoutStats,
    /// Records achieved during the session
    pub records: Vec<PersonalRecord>,
}

impl WorkoutSummary {
    /// Load the summary of `workout_id`
    ///
    /// Personal records are optional: a failed fetch yields none.
    #[instrument(skip(db))]
    pub async fn load(db: &Database, workout_id: Uuid) -> AppResult<Self> {
        let workout = db.workouts.get_workout(workout_id).await?;
        let exercises = load_exercises(db, workout_id).await?;
        let records = db.records.for_workout_or_empty(workout_id).await;

        let stats = WorkoutStats::from_groups(
            exercises.iter().map(|e| e.sets.as_slice()),
            workout.duration_secs(Utc::now()),
        );
        Ok(Self {
            workout,
            exercises: exercises
                .into_iter()
                .map(ExerciseBreakdown::from_exercise)
                .collect(),
            stats,
            records,
        })
    }
}

/// One completed session in the history list
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    /// Session header
    pub workout: Workout,
    /// Number of exercise slots
    pub exercise_count: usize,
    /// Session totals
    pub stats: WorkoutStats,
}

/// Completed sessions of `user_id`, newest first, with their totals
///
/// Issues three queries regardless of `limit`: headers, slots, sets.
#[instrument(skip(db))]
pub async fn history(db: &Database, user_id: Uuid, limit: usize) -> AppResult<Vec<HistoryEntry>> {
    let workouts = db.workouts.completed_workouts(user_id, limit).await?;
    if workouts.is_empty() {
        return Ok(Vec::new());
    }
    let workout_ids: Vec<Uuid> = workouts.iter().map(|w| w.id).collect();
    let slots = db.workouts.exercises_for_workouts(&workout_ids).await?;
    let slot_ids: Vec<Uuid> = slots.iter().map(|s| s.id).collect();
    let sets = db.workouts.sets_for_exercises(&slot_ids).await?;

    let mut by_workout: HashMap<Uuid, Vec<ActiveExercise>> = HashMap::new();
    for exercise in assemble_exercises(slots, &HashMap::new(), sets) {
        by_workout
            .entry(exercise.workout_exercise.workout_id)
            .or_default()
            .push(exercise);
    }

    let now = Utc::now();
    Ok(workouts
        .into_iter()
        .map(|workout| {
            let exercises = by_workout.remove(&workout.id).unwrap_or_default();
            let stats = WorkoutStats::from_groups(
                exercises.iter().map(|e| e.sets.as_slice()),
                workout.duration_secs(now),
            );
            HistoryEntry {
                exercise_count: exercises.len(),
                workout,
                stats,
            }
        })
        .collect())
}
