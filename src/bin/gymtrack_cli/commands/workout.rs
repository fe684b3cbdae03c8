// ABOUTME: Active workout commands for gymtrack-cli
// ABOUTME: Start, inspect, log, edit, delete, swap, rest, finish, and abandon a session
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gymtrack Contributors

use gymtrack::client::GymtrackClient;
use gymtrack::errors::{AppError, AppResult};
use gymtrack::models::{SetData, SetUpdate};
use gymtrack::workout::{format_duration, RestTimerEvent, RestTimerHandle};
use tracing::info;
use uuid::Uuid;

use crate::helpers::display::{display_session, display_stats, format_set};
use crate::helpers::session::{open_session, slot_at, weight_unit};

/// Values of a set as entered on the command line
pub struct SetArgs {
    pub weight: Option<f64>,
    pub reps: u32,
    pub rpe: Option<f64>,
    pub warmup: bool,
    pub failure: bool,
    pub dropset: bool,
}

impl SetArgs {
    fn into_data(self) -> SetData {
        SetData {
            weight: self.weight,
            reps: Some(self.reps),
            rpe: self.rpe,
            is_warmup: self.warmup,
            is_failure: self.failure,
            is_dropset: self.dropset,
        }
    }
}

pub async fn start(client: &GymtrackClient, template_id: Uuid) -> AppResult<()> {
    if let Some(existing) = client.find_in_progress().await? {
        return Err(AppError::invalid_state(format!(
            "'{}' is still in progress; finish or abandon it first",
            existing.name
        )));
    }
    let store = client.workout_store().await?;
    let workout = store.start_workout(template_id).await?;
    info!(workout_id = %workout.id, "Workout started");
    display_session(&store.snapshot().await, weight_unit(client).await);
    Ok(())
}

pub async fn status(client: &GymtrackClient) -> AppResult<()> {
    let unit = weight_unit(client).await;
    match client.find_in_progress().await? {
        Some(_) => {
            let store = open_session(client).await?;
            display_session(&store.snapshot().await, unit);
        }
        None => println!("No workout in progress."),
    }
    Ok(())
}

pub async fn log(client: &GymtrackClient, slot: usize, set: SetArgs) -> AppResult<()> {
    let store = open_session(client).await?;
    let state = store.snapshot().await;
    let exercise = slot_at(&state, slot)?;
    let logged = store.log_set(exercise.id(), set.into_data()).await?;
    println!(
        "{}: {}",
        exercise.name(),
        format_set(&logged, weight_unit(client).await)
    );
    display_stats(&store.workout_stats().await, weight_unit(client).await);
    Ok(())
}

pub async fn edit(
    client: &GymtrackClient,
    set_id: Uuid,
    weight: Option<f64>,
    reps: Option<u32>,
    rpe: Option<f64>,
) -> AppResult<()> {
    let update = SetUpdate {
        weight: weight.map(Some),
        reps: reps.map(Some),
        rpe: rpe.map(Some),
        ..SetUpdate::default()
    };
    if update == SetUpdate::default() {
        return Err(AppError::invalid_input(
            "Nothing to change; pass --weight, --reps or --rpe",
        ));
    }
    let store = open_session(client).await?;
    let set = store.update_set(set_id, &update).await?;
    println!("Updated {}", format_set(&set, weight_unit(client).await));
    Ok(())
}

pub async fn delete_set(client: &GymtrackClient, set_id: Uuid) -> AppResult<()> {
    let store = open_session(client).await?;
    store.delete_set(set_id).await?;
    println!("Set deleted.");
    display_session(&store.snapshot().await, weight_unit(client).await);
    Ok(())
}

pub async fn swap(client: &GymtrackClient, slot: usize, exercise_id: Uuid) -> AppResult<()> {
    let store = open_session(client).await?;
    let state = store.snapshot().await;
    let current = slot_at(&state, slot)?;
    let from = current.name().to_owned();
    let swapped = store.swap_exercise(current.id(), exercise_id).await?;
    println!("Swapped {from} for {}", swapped.name());
    Ok(())
}

pub async fn previous(client: &GymtrackClient, slot: usize) -> AppResult<()> {
    let store = open_session(client).await?;
    let state = store.snapshot().await;
    let exercise = slot_at(&state, slot)?;
    let sets = store
        .get_previous_sets(exercise.workout_exercise.exercise_id)
        .await?;
    if sets.is_empty() {
        println!("No previous sets for {}.", exercise.name());
        return Ok(());
    }
    let unit = weight_unit(client).await;
    println!("Last time on {}:", exercise.name());
    for set in &sets {
        println!("   {}", format_set(set, unit));
    }
    Ok(())
}

/// Run a rest countdown in the terminal until it completes
pub async fn rest(client: &GymtrackClient, slot: Option<usize>, seconds: Option<u64>) -> AppResult<()> {
    let duration = match (seconds, slot) {
        (Some(seconds), _) => seconds,
        (None, Some(slot)) => {
            let store = open_session(client).await?;
            let state = store.snapshot().await;
            slot_at(&state, slot)?.rest_secs(client.default_rest_secs())
        }
        (None, None) => client.default_rest_secs(),
    };

    let (timer, mut events) = RestTimerHandle::start(duration, None);
    println!("Resting {}", format_duration(duration));
    while let Some(event) = events.recv().await {
        match event {
            RestTimerEvent::Tick { remaining_secs } if remaining_secs % 15 == 0 || remaining_secs <= 5 => {
                println!("   {}", format_duration(remaining_secs));
            }
            RestTimerEvent::Completed => {
                println!("\x07Rest over, next set!");
                break;
            }
            _ => {}
        }
    }
    drop(timer);
    Ok(())
}

pub async fn finish(client: &GymtrackClient) -> AppResult<()> {
    let store = open_session(client).await?;
    let stats = store.workout_stats().await;
    let workout = store.complete_workout().await?;
    println!("Workout complete: {}", workout.name);
    display_stats(&stats, weight_unit(client).await);
    println!("See the summary with `gymtrack-cli summary {}`", workout.id);
    Ok(())
}

pub async fn abandon(client: &GymtrackClient) -> AppResult<()> {
    let store = open_session(client).await?;
    let workout = store.abandon_workout().await?;
    println!("Abandoned {}.", workout.name);
    Ok(())
}
