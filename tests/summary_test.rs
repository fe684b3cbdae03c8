// ABOUTME: Tests for post-workout summaries and the completed workout history
// ABOUTME: Covers per-exercise breakdowns, best sets, personal records, and history ordering
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gymtrack Contributors
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use chrono::{TimeZone, Utc};
use common::fixture;
use gymtrack::backend::Operation;
use gymtrack::config::SwapPolicy;
use gymtrack::constants::collections::PERSONAL_RECORDS;
use gymtrack::errors::ErrorCode;
use gymtrack::models::SetData;
use gymtrack::workout::{history, WorkoutSummary};
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn test_summary_breaks_down_each_exercise() {
    let fx = fixture().await;
    let store = fx.store(SwapPolicy::KeepSets);
    store.start_workout(fx.template_id).await.unwrap();
    let state = store.snapshot().await;
    let (bench, squat) = (state.exercises[0].id(), state.exercises[1].id());

    store.log_set(bench, SetData::warmup(60.0, 5)).await.unwrap();
    store.log_set(bench, SetData::working(100.0, 8)).await.unwrap();
    store.log_set(bench, SetData::working(120.0, 1)).await.unwrap();
    store.log_set(squat, SetData::working(140.0, 5)).await.unwrap();
    let workout = store.complete_workout().await.unwrap();

    fx.backend
        .seed(
            PERSONAL_RECORDS,
            [json!({
                "id": Uuid::new_v4(),
                "user_id": fx.user_id,
                "exercise_id": fx.catalog.bench,
                "workout_id": workout.id,
                "weight": 120.0,
                "reps": 1,
                "achieved_at": Utc::now(),
            })],
        )
        .await;

    let summary = WorkoutSummary::load(&fx.db, workout.id).await.unwrap();
    assert_eq!(summary.workout.id, workout.id);
    let names: Vec<&str> = summary.exercises.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["Bench Press", "Back Squat", "Barbell Row"]);

    let bench = &summary.exercises[0];
    assert_eq!(bench.sets.len(), 3);
    assert_eq!(bench.working_sets, 2);
    assert_eq!(bench.volume, 920);
    let best = bench.best_set.as_ref().unwrap();
    assert_eq!((best.data.weight, best.data.reps), (Some(100.0), Some(8)));

    assert_eq!(summary.exercises[1].volume, 700);
    assert!(summary.exercises[2].best_set.is_none());

    assert_eq!(summary.stats.total_sets, 3);
    assert_eq!(summary.stats.total_volume, 1620);
    assert_eq!(summary.stats.exercises_with_sets, 2);
    assert_eq!(summary.records.len(), 1);
    assert_eq!(summary.records[0].exercise_id, fx.catalog.bench);
}

#[tokio::test]
async fn test_summary_marks_substitutions() {
    let fx = fixture().await;
    let store = fx.store(SwapPolicy::KeepSets);
    store.start_workout(fx.template_id).await.unwrap();
    let bench = store.snapshot().await.exercises[0].id();

    store
        .swap_exercise(bench, fx.catalog.dumbbell_bench)
        .await
        .unwrap();
    store.log_set(bench, SetData::working(30.0, 10)).await.unwrap();
    let workout = store.complete_workout().await.unwrap();

    let summary = WorkoutSummary::load(&fx.db, workout.id).await.unwrap();
    let first = &summary.exercises[0];
    assert!(first.is_substitution);
    assert_eq!(first.name, "Dumbbell Bench Press");
    assert_eq!(first.volume, 300);
}

#[tokio::test]
async fn test_summary_survives_record_failure() {
    let fx = fixture().await;
    let workout_id = fx
        .seed_completed_workout(fx.catalog.squat, &[(100.0, 5, false)], Utc::now())
        .await;
    fx.backend
        .fail_next(PERSONAL_RECORDS, Operation::Select, 500, "records offline")
        .await;

    let summary = WorkoutSummary::load(&fx.db, workout_id).await.unwrap();
    assert!(summary.records.is_empty());
    assert_eq!(summary.stats.total_volume, 500);
    assert_eq!(summary.stats.duration_secs, 45 * 60);
}

#[tokio::test]
async fn test_summary_of_unknown_workout() {
    let fx = fixture().await;
    let err = WorkoutSummary::load(&fx.db, Uuid::new_v4()).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn test_history_lists_completed_newest_first() {
    let fx = fixture().await;
    let day = |d| Utc.with_ymd_and_hms(2025, 3, d, 18, 0, 0).unwrap();
    let oldest = fx
        .seed_completed_workout(fx.catalog.squat, &[(100.0, 5, false)], day(1))
        .await;
    let newest = fx
        .seed_completed_workout(
            fx.catalog.bench,
            &[(40.0, 10, true), (80.0, 5, false), (80.0, 5, false)],
            day(8),
        )
        .await;
    let middle = fx
        .seed_completed_workout(fx.catalog.row, &[(60.0, 8, false)], day(4))
        .await;

    // In-progress sessions are not history
    let store = fx.store(SwapPolicy::KeepSets);
    store.start_workout(fx.template_id).await.unwrap();

    let entries = history(&fx.db, fx.user_id, 20).await.unwrap();
    let ids: Vec<Uuid> = entries.iter().map(|e| e.workout.id).collect();
    assert_eq!(ids, [newest, middle, oldest]);

    let latest = &entries[0];
    assert_eq!(latest.exercise_count, 1);
    assert_eq!(latest.stats.total_sets, 2);
    assert_eq!(latest.stats.total_volume, 800);
    assert_eq!(latest.stats.duration_secs, 45 * 60);

    let limited = history(&fx.db, fx.user_id, 2).await.unwrap();
    assert_eq!(limited.len(), 2);
    assert_eq!(limited[0].workout.id, newest);
}

#[tokio::test]
async fn test_history_is_per_user_and_may_be_empty() {
    let fx = fixture().await;
    assert!(history(&fx.db, fx.user_id, 20).await.unwrap().is_empty());

    fx.seed_completed_workout(fx.catalog.squat, &[(100.0, 5, false)], Utc::now())
        .await;
    assert!(history(&fx.db, Uuid::new_v4(), 20).await.unwrap().is_empty());
    assert_eq!(history(&fx.db, fx.user_id, 20).await.unwrap().len(), 1);
}
