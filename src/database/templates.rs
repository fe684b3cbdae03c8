// ABOUTME: Workout template access for browsing and starting sessions
// ABOUTME: Lists a user's templates with counts and loads one template with its exercises
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gymtrack Contributors

use crate::backend::{BackendExt, Query, SharedBackend};
use crate::constants::collections::{EXERCISES, TEMPLATE_EXERCISES, WORKOUT_TEMPLATES};
use crate::errors::AppResult;
use crate::models::{
    Exercise, TemplateExercise, TemplateExerciseDetail, TemplateWithExercises, WorkoutTemplate,
};
use serde::Serialize;
use std::collections::HashMap;
use tracing::warn;
use uuid::Uuid;

/// A template with the figures shown on the template list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateSummary {
    /// Template header
    pub template: WorkoutTemplate,
    /// Number of exercises
    pub exercise_count: usize,
    /// Planned working sets
    pub total_sets: u32,
}

/// Access to `workout_templates` and `template_exercises`
#[derive(Clone)]
pub struct TemplateManager {
    backend: SharedBackend,
}

impl TemplateManager {
    /// Create a manager over `backend`
    #[must_use]
    pub const fn new(backend: SharedBackend) -> Self {
        Self { backend }
    }

    /// Templates owned by `user_id`, ordered by name
    pub async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<WorkoutTemplate>> {
        self.backend
            .fetch(
                &Query::table(WORKOUT_TEMPLATES)
                    .eq("user_id", user_id)
                    .order("name", true),
            )
            .await
    }

    /// Templates with exercise and set counts; degrades to an empty list on failure
    pub async fn summaries_for_user(&self, user_id: Uuid) -> Vec<TemplateSummary> {
        match self.load_summaries(user_id).await {
            Ok(summaries) => summaries,
            Err(e) => {
                warn!(%user_id, error = %e, "Failed to load templates");
                Vec::new()
            }
        }
    }

    async fn load_summaries(&self, user_id: Uuid) -> AppResult<Vec<TemplateSummary>> {
        let templates = self.list_for_user(user_id).await?;
        let ids: Vec<Uuid> = templates.iter().map(|t| t.id).collect();
        let targets: Vec<TemplateExercise> = self
            .backend
            .fetch(&Query::table(TEMPLATE_EXERCISES).in_list("template_id", &ids))
            .await?;

        let mut by_template: HashMap<Uuid, (usize, u32)> = HashMap::new();
        for target in &targets {
            let entry = by_template.entry(target.template_id).or_default();
            entry.0 += 1;
            entry.1 += target.target_sets;
        }

        Ok(templates
            .into_iter()
            .map(|template| {
                let (exercise_count, total_sets) =
                    by_template.get(&template.id).copied().unwrap_or_default();
                TemplateSummary {
                    template,
                    exercise_count,
                    total_sets,
                }
            })
            .collect())
    }

    /// Template header only
    pub async fn get(&self, template_id: Uuid) -> AppResult<WorkoutTemplate> {
        self.backend
            .fetch_one(
                &Query::table(WORKOUT_TEMPLATES).eq("id", template_id),
                "Workout template",
            )
            .await
    }

    /// Template with exercises ordered by `order_index`, joined with the catalog
    pub async fn get_with_exercises(&self, template_id: Uuid) -> AppResult<TemplateWithExercises> {
        let template = self.get(template_id).await?;
        let targets: Vec<TemplateExercise> = self
            .backend
            .fetch(
                &Query::table(TEMPLATE_EXERCISES)
                    .eq("template_id", template_id)
                    .order("order_index", true),
            )
            .await?;

        let exercise_ids: Vec<Uuid> = targets.iter().map(|t| t.exercise_id).collect();
        let catalog: Vec<Exercise> = self
            .backend
            .fetch(&Query::table(EXERCISES).in_list("id", &exercise_ids))
            .await?;
        let catalog: HashMap<Uuid, Exercise> = catalog.into_iter().map(|e| (e.id, e)).collect();

        let exercises = targets
            .into_iter()
            .map(|target| TemplateExerciseDetail {
                exercise: catalog.get(&target.exercise_id).cloned(),
                target,
            })
            .collect();

        Ok(TemplateWithExercises {
            template,
            exercises,
        })
    }
}
