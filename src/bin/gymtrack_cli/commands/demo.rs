// ABOUTME: Offline demo for gymtrack-cli running a full session against in-memory services
// ABOUTME: Signs up, seeds a template, logs, edits, swaps and deletes sets, then prints the summary
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gymtrack Contributors

use gymtrack::auth::{MemoryIdentity, MemorySessionStorage};
use gymtrack::backend::{AuthToken, MemoryBackend};
use gymtrack::client::GymtrackClient;
use gymtrack::config::{ClientConfig, SwapPolicy};
use gymtrack::constants::collections::{EXERCISES, TEMPLATE_EXERCISES, WORKOUT_TEMPLATES};
use gymtrack::errors::{AppError, AppResult};
use gymtrack::models::{SetData, SetUpdate, WeightUnit};
use gymtrack::workout::{CompletionSignal, RestTimerEvent, SetInputModel};
use serde_json::json;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::helpers::display::{display_history, display_session, display_summary, display_templates};

struct TerminalBell;

impl CompletionSignal for TerminalBell {
    fn signal(&self) {
        println!("\x07(bzzz) Rest over");
    }
}

struct Catalog {
    bench: Uuid,
    dumbbell_bench: Uuid,
    row: Uuid,
    squat: Uuid,
}

async fn seed_catalog(backend: &MemoryBackend) -> Catalog {
    let catalog = Catalog {
        bench: Uuid::new_v4(),
        dumbbell_bench: Uuid::new_v4(),
        row: Uuid::new_v4(),
        squat: Uuid::new_v4(),
    };
    backend
        .seed(
            EXERCISES,
            [
                json!({"id": catalog.bench, "name": "Bench Press", "primary_muscle_group": "chest",
                       "secondary_muscle_groups": ["triceps"], "equipment": "barbell", "is_compound": true}),
                json!({"id": catalog.dumbbell_bench, "name": "Dumbbell Bench Press", "primary_muscle_group": "chest",
                       "equipment": "dumbbell", "is_compound": true}),
                json!({"id": catalog.row, "name": "Barbell Row", "primary_muscle_group": "back",
                       "equipment": "barbell", "is_compound": true}),
                json!({"id": catalog.squat, "name": "Back Squat", "primary_muscle_group": "quads",
                       "secondary_muscle_groups": ["glutes"], "equipment": "barbell", "is_compound": true}),
            ],
        )
        .await;
    catalog
}

async fn seed_template(backend: &MemoryBackend, user_id: Uuid, catalog: &Catalog) -> Uuid {
    let template_id = Uuid::new_v4();
    backend
        .seed(
            WORKOUT_TEMPLATES,
            [json!({"id": template_id, "user_id": user_id, "name": "Full Body A"})],
        )
        .await;
    let targets = [catalog.bench, catalog.row, catalog.squat]
        .into_iter()
        .enumerate()
        .map(|(index, exercise_id)| {
            json!({
                "id": Uuid::new_v4(),
                "template_id": template_id,
                "exercise_id": exercise_id,
                "order_index": index,
                "target_sets": 3,
                "target_reps_min": 5,
                "target_reps_max": 8,
                "rest_seconds": 3,
            })
        });
    backend.seed(TEMPLATE_EXERCISES, targets).await;
    template_id
}

pub async fn run() -> AppResult<()> {
    info!("Running offline demo");
    let backend = Arc::new(MemoryBackend::new());
    let identity = Arc::new(MemoryIdentity::new());
    let mut config = ClientConfig::new("http://localhost:54321", "demo-anon-key");
    // Swapped-out sets are removed so the summary matches what the session showed
    config.swap_policy = SwapPolicy::DeleteSets;
    let client = GymtrackClient::from_parts(
        backend.clone(),
        identity,
        Arc::new(MemorySessionStorage::new()),
        AuthToken::new(),
        &config,
    );
    let catalog = seed_catalog(&backend).await;

    client
        .auth()
        .sign_up("demo@gymtrack.dev", "demo-password", Some("Demo Lifter"))
        .await?;
    let user_id = client.auth().require_user_id().await?;
    let template_id = seed_template(&backend, user_id, &catalog).await;
    let unit = WeightUnit::Kg;

    println!("Templates:");
    display_templates(&client.templates().summaries_for_user(user_id).await);

    let store = client.workout_store().await?;
    store.start_workout(template_id).await?;
    let state = store.snapshot().await;
    let [bench, barbell_row, squat] = [0, 1, 2].map(|i| state.exercises.get(i).cloned());
    let (Some(bench), Some(barbell_row), Some(squat)) = (bench, barbell_row, squat) else {
        return Err(AppError::internal("Demo template did not produce three exercises"));
    };

    // Bench through the input rows, the way a screen would
    let mut inputs = SetInputModel::seed(&bench, &store.get_previous_sets(catalog.bench).await?);
    for (index, (weight, reps)) in [(60.0, 8), (80.0, 5), (80.0, 5)].into_iter().enumerate() {
        if let Some(row) = inputs.row_mut(index) {
            row.weight = Some(weight);
            row.reps = Some(reps);
        }
        inputs.save_row(&store, index).await?;
    }

    let (timer, mut events) = client.start_rest(&bench, Some(Arc::new(TerminalBell)));
    while let Some(event) = events.recv().await {
        if let RestTimerEvent::Tick { remaining_secs } = event {
            println!("   rest {remaining_secs}s");
        }
    }
    drop(timer);

    store.log_set(barbell_row.id(), SetData::working(70.0, 8)).await?;
    store.log_set(barbell_row.id(), SetData::working(70.0, 8)).await?;

    let warmup = store.log_set(squat.id(), SetData::warmup(60.0, 5)).await?;
    let first = store.log_set(squat.id(), SetData::working(100.0, 5)).await?;
    store.log_set(squat.id(), SetData::working(100.0, 5)).await?;
    store
        .update_set(first.id, &SetUpdate { reps: Some(Some(6)), ..SetUpdate::default() })
        .await?;
    store.delete_set(warmup.id).await?;

    display_session(&store.snapshot().await, unit);

    // Bench rack taken: finish on dumbbells
    store.swap_exercise(bench.id(), catalog.dumbbell_bench).await?;
    store.log_set(bench.id(), SetData::working(30.0, 10)).await?;

    let workout = store.complete_workout().await?;
    display_summary(&client.summary(workout.id).await?, unit);
    println!();
    display_history(&client.history(10).await?, unit);
    Ok(())
}
