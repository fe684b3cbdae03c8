// ABOUTME: Session helpers for gymtrack-cli
// ABOUTME: Reattaches to the in-progress workout and resolves 1-based slot numbers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gymtrack Contributors

use gymtrack::client::GymtrackClient;
use gymtrack::errors::{AppError, AppResult};
use gymtrack::models::WeightUnit;
use gymtrack::workout::{ActiveExercise, ActiveWorkoutStore, WorkoutState};

/// Each CLI invocation is a fresh process, so the running workout is resumed from the backend
pub async fn open_session(client: &GymtrackClient) -> AppResult<ActiveWorkoutStore> {
    let store = client.workout_store().await?;
    let Some(workout) = client.find_in_progress().await? else {
        return Err(AppError::invalid_state(
            "No workout in progress. Start one with `gymtrack-cli workout start <template-id>`",
        ));
    };
    store.resume_workout(workout.id).await?;
    Ok(store)
}

/// Slot at 1-based position `slot`
pub fn slot_at(state: &WorkoutState, slot: usize) -> AppResult<&ActiveExercise> {
    slot.checked_sub(1)
        .and_then(|index| state.exercises.get(index))
        .ok_or_else(|| {
            AppError::invalid_input(format!(
                "Exercise {slot} does not exist; this workout has {}",
                state.exercises.len()
            ))
        })
}

/// Unit preference of the signed-in user
pub async fn weight_unit(client: &GymtrackClient) -> WeightUnit {
    client
        .auth()
        .snapshot()
        .await
        .profile
        .map(|p| p.unit_preference)
        .unwrap_or_default()
}
