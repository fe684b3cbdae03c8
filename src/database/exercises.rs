// ABOUTME: Exercise catalog access with name search and muscle group filtering
// ABOUTME: Read-only; also proposes swap alternatives working the same muscle group
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gymtrack Contributors

use crate::backend::{BackendExt, Query, SharedBackend};
use crate::constants::collections::EXERCISES;
use crate::constants::limits::MAX_EXERCISE_SEARCH_RESULTS;
use crate::errors::AppResult;
use crate::models::Exercise;
use std::collections::HashMap;
use tracing::warn;
use uuid::Uuid;

/// Access to the `exercises` collection
#[derive(Clone)]
pub struct ExerciseManager {
    backend: SharedBackend,
}

impl ExerciseManager {
    /// Create a manager over `backend`
    #[must_use]
    pub const fn new(backend: SharedBackend) -> Self {
        Self { backend }
    }

    /// Whole catalog ordered by name
    pub async fn list(&self) -> AppResult<Vec<Exercise>> {
        self.backend
            .fetch(&Query::table(EXERCISES).order("name", true))
            .await
    }

    /// Whole catalog, or an empty list if the fetch fails
    pub async fn list_or_empty(&self) -> Vec<Exercise> {
        self.list().await.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load exercise catalog");
            Vec::new()
        })
    }

    /// One exercise by id
    pub async fn get(&self, id: Uuid) -> AppResult<Exercise> {
        self.backend
            .fetch_one(&Query::table(EXERCISES).eq("id", id), "Exercise")
            .await
    }

    /// Several exercises keyed by id; unknown ids are simply absent
    pub async fn get_many(&self, ids: &[Uuid]) -> AppResult<HashMap<Uuid, Exercise>> {
        let mut unique = ids.to_vec();
        unique.sort_unstable();
        unique.dedup();
        let rows: Vec<Exercise> = self
            .backend
            .fetch(&Query::table(EXERCISES).in_list("id", &unique))
            .await?;
        Ok(rows.into_iter().map(|e| (e.id, e)).collect())
    }

    /// Case-insensitive name search
    pub async fn search(&self, name: &str, limit: Option<usize>) -> AppResult<Vec<Exercise>> {
        let limit = limit
            .unwrap_or(MAX_EXERCISE_SEARCH_RESULTS)
            .min(MAX_EXERCISE_SEARCH_RESULTS);
        self.backend
            .fetch(
                &Query::table(EXERCISES)
                    .ilike("name", name)
                    .order("name", true)
                    .limit(limit),
            )
            .await
    }

    /// Exercises working `muscle` as primary or secondary group
    pub async fn by_muscle_group(&self, muscle: &str) -> AppResult<Vec<Exercise>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|e| e.works(muscle))
            .collect())
    }

    /// Candidates for swapping `exercise_id`: same primary muscle group, compound ones first
    pub async fn alternatives_for(&self, exercise_id: Uuid) -> AppResult<Vec<Exercise>> {
        let current = self.get(exercise_id).await?;
        let mut candidates: Vec<Exercise> = self
            .backend
            .fetch(
                &Query::table(EXERCISES)
                    .eq("primary_muscle_group", &current.primary_muscle_group)
                    .neq("id", exercise_id)
                    .order("name", true),
            )
            .await?;
        candidates.sort_by_key(|e| !e.is_compound);
        Ok(candidates)
    }
}
