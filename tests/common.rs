// ABOUTME: Shared test fixtures for integration tests
// ABOUTME: Seeds an in-memory backend with a catalog, a template, and completed workouts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gymtrack Contributors
#![allow(
    dead_code,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `gymtrack`

use chrono::{DateTime, Utc};
use gymtrack::backend::{MemoryBackend, SharedBackend};
use gymtrack::config::SwapPolicy;
use gymtrack::constants::collections::{
    EXERCISES, TEMPLATE_EXERCISES, WORKOUTS, WORKOUT_EXERCISES, WORKOUT_SETS, WORKOUT_TEMPLATES,
};
use gymtrack::database::Database;
use gymtrack::workout::ActiveWorkoutStore;
use serde_json::json;
use std::sync::{Arc, Once};
use uuid::Uuid;

static INIT_LOGGER: Once = Once::new();

/// Quiet logging for tests; `TEST_LOG=debug` for more
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE" | "trace") => tracing::Level::TRACE,
            Ok("DEBUG" | "debug") => tracing::Level::DEBUG,
            Ok("INFO" | "info") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };
        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_test_writer()
            .init();
    });
}

/// Catalog exercise ids
#[derive(Debug, Clone, Copy)]
pub struct Catalog {
    pub bench: Uuid,
    pub squat: Uuid,
    pub row: Uuid,
    pub dumbbell_bench: Uuid,
}

/// Seeded in-memory world: one user, a catalog, and a 3 x 3 template
pub struct Fixture {
    pub backend: Arc<MemoryBackend>,
    pub db: Database,
    pub user_id: Uuid,
    pub template_id: Uuid,
    pub catalog: Catalog,
}

impl Fixture {
    pub fn shared_backend(&self) -> SharedBackend {
        self.backend.clone()
    }

    /// Idle store for the fixture user
    pub fn store(&self, policy: SwapPolicy) -> ActiveWorkoutStore {
        ActiveWorkoutStore::new(self.db.clone(), self.user_id, policy)
    }

    /// Insert a completed workout with one slot of `exercise_id` holding `sets` as (weight, reps, warmup)
    pub async fn seed_completed_workout(
        &self,
        exercise_id: Uuid,
        sets: &[(f64, u32, bool)],
        completed_at: DateTime<Utc>,
    ) -> Uuid {
        let workout_id = Uuid::new_v4();
        let slot_id = Uuid::new_v4();
        let started_at = completed_at - chrono::Duration::minutes(45);
        self.backend
            .seed(
                WORKOUTS,
                [json!({
                    "id": workout_id,
                    "user_id": self.user_id,
                    "name": "Earlier session",
                    "status": "completed",
                    "started_at": started_at,
                    "completed_at": completed_at,
                })],
            )
            .await;
        self.backend
            .seed(
                WORKOUT_EXERCISES,
                [json!({
                    "id": slot_id,
                    "workout_id": workout_id,
                    "exercise_id": exercise_id,
                    "order_index": 0,
                    "target_sets": 3,
                })],
            )
            .await;
        let rows = sets.iter().enumerate().map(|(index, (weight, reps, warmup))| {
            json!({
                "id": Uuid::new_v4(),
                "workout_exercise_id": slot_id,
                "set_number": index + 1,
                "weight": weight,
                "reps": reps,
                "is_warmup": warmup,
                "is_failure": false,
                "is_dropset": false,
            })
        });
        self.backend.seed(WORKOUT_SETS, rows).await;
        workout_id
    }
}

/// Seed the standard fixture
pub async fn fixture() -> Fixture {
    init_test_logging();
    let backend = Arc::new(MemoryBackend::new());
    let user_id = Uuid::new_v4();
    let template_id = Uuid::new_v4();
    let catalog = Catalog {
        bench: Uuid::new_v4(),
        squat: Uuid::new_v4(),
        row: Uuid::new_v4(),
        dumbbell_bench: Uuid::new_v4(),
    };

    backend
        .seed(
            EXERCISES,
            [
                json!({"id": catalog.bench, "name": "Bench Press", "primary_muscle_group": "chest", "is_compound": true}),
                json!({"id": catalog.squat, "name": "Back Squat", "primary_muscle_group": "quads", "is_compound": true}),
                json!({"id": catalog.row, "name": "Barbell Row", "primary_muscle_group": "back", "is_compound": true}),
                json!({"id": catalog.dumbbell_bench, "name": "Dumbbell Bench Press", "primary_muscle_group": "chest"}),
            ],
        )
        .await;
    backend
        .seed(
            WORKOUT_TEMPLATES,
            [json!({"id": template_id, "user_id": user_id, "name": "Full Body A"})],
        )
        .await;
    // Seeded out of order to check ordering by order_index
    backend
        .seed(
            TEMPLATE_EXERCISES,
            [(2, catalog.row), (0, catalog.bench), (1, catalog.squat)].map(|(index, exercise_id)| {
                json!({
                    "id": Uuid::new_v4(),
                    "template_id": template_id,
                    "exercise_id": exercise_id,
                    "order_index": index,
                    "target_sets": 3,
                    "target_reps_min": 5,
                    "target_reps_max": 8,
                    "rest_seconds": 120,
                })
            }),
        )
        .await;

    Fixture {
        db: Database::new(backend.clone()),
        backend,
        user_id,
        template_id,
        catalog,
    }
}
