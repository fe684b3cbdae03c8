// ABOUTME: Tests for the per-collection managers over the in-memory backend
// ABOUTME: Covers the exercise catalog, template listing and detail, and profile edits
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gymtrack Contributors
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::fixture;
use gymtrack::backend::Operation;
use gymtrack::constants::collections::{EXERCISES, PROFILES, TEMPLATE_EXERCISES, WORKOUT_TEMPLATES};
use gymtrack::errors::ErrorCode;
use gymtrack::models::{NewProfile, ProfileUpdate, WeightUnit};
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn test_exercise_search_is_case_insensitive() {
    let fx = fixture().await;
    let found = fx.db.exercises.search("BENCH", None).await.unwrap();
    let names: Vec<&str> = found.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["Bench Press", "Dumbbell Bench Press"]);

    let limited = fx.db.exercises.search("e", Some(1)).await.unwrap();
    assert_eq!(limited.len(), 1);
}

#[tokio::test]
async fn test_exercises_by_muscle_and_alternatives() {
    let fx = fixture().await;
    let chest = fx.db.exercises.by_muscle_group("Chest").await.unwrap();
    assert_eq!(chest.len(), 2);

    let alternatives = fx
        .db
        .exercises
        .alternatives_for(fx.catalog.bench)
        .await
        .unwrap();
    let ids: Vec<Uuid> = alternatives.iter().map(|e| e.id).collect();
    assert_eq!(ids, [fx.catalog.dumbbell_bench]);

    let err = fx
        .db
        .exercises
        .alternatives_for(Uuid::new_v4())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn test_catalog_degrades_to_empty_on_failure() {
    let fx = fixture().await;
    assert_eq!(fx.db.exercises.list_or_empty().await.len(), 4);

    fx.backend
        .fail_next(EXERCISES, Operation::Select, 500, "catalog offline")
        .await;
    assert!(fx.db.exercises.list_or_empty().await.is_empty());
    assert_eq!(fx.db.exercises.list_or_empty().await.len(), 4);
}

#[tokio::test]
async fn test_template_summaries_count_exercises_and_sets() {
    let fx = fixture().await;
    let empty_template = Uuid::new_v4();
    fx.backend
        .seed(
            WORKOUT_TEMPLATES,
            [
                json!({"id": empty_template, "user_id": fx.user_id, "name": "Arms"}),
                json!({"id": Uuid::new_v4(), "user_id": Uuid::new_v4(), "name": "Someone else's"}),
            ],
        )
        .await;

    let summaries = fx.db.templates.summaries_for_user(fx.user_id).await;
    let listed: Vec<(&str, usize, u32)> = summaries
        .iter()
        .map(|s| (s.template.name.as_str(), s.exercise_count, s.total_sets))
        .collect();
    assert_eq!(listed, [("Arms", 0, 0), ("Full Body A", 3, 9)]);

    fx.backend
        .fail_next(TEMPLATE_EXERCISES, Operation::Select, 500, "boom")
        .await;
    assert!(fx.db.templates.summaries_for_user(fx.user_id).await.is_empty());
}

#[tokio::test]
async fn test_template_detail_is_ordered_and_joined() {
    let fx = fixture().await;
    let detail = fx
        .db
        .templates
        .get_with_exercises(fx.template_id)
        .await
        .unwrap();
    assert_eq!(detail.template.name, "Full Body A");
    let ordered: Vec<Uuid> = detail.exercises.iter().map(|e| e.target.exercise_id).collect();
    assert_eq!(
        ordered,
        [fx.catalog.bench, fx.catalog.squat, fx.catalog.row]
    );
    assert!(detail.exercises.iter().all(|e| e.exercise.is_some()));

    let err = fx
        .db
        .templates
        .get_with_exercises(Uuid::new_v4())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn test_profile_create_and_update() {
    let fx = fixture().await;
    let created = fx
        .db
        .profiles
        .create(&NewProfile {
            id: fx.user_id,
            email: "lifter@example.com".into(),
            display_name: Some("Sam".into()),
            unit_preference: WeightUnit::Kg,
        })
        .await
        .unwrap();
    assert_eq!(created.id, fx.user_id);

    let updated = fx
        .db
        .profiles
        .update(
            fx.user_id,
            &ProfileUpdate {
                display_name: Some("Samira".into()),
                ..ProfileUpdate::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.display_name.as_deref(), Some("Samira"));
    assert!(updated.updated_at.is_some());
    assert_eq!(fx.backend.rows(PROFILES).await.len(), 1);

    let err = fx
        .db
        .profiles
        .update(fx.user_id, &ProfileUpdate::default())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    let err = fx
        .db
        .profiles
        .update(
            Uuid::new_v4(),
            &ProfileUpdate {
                unit_preference: Some(WeightUnit::Lbs),
                ..ProfileUpdate::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}
