// ABOUTME: Workout templates and their ordered target exercises
// ABOUTME: Authored ahead of time and read when a session starts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gymtrack Contributors

use super::Exercise;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A row of the `workout_templates` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutTemplate {
    /// Unique identifier
    pub id: Uuid,
    /// Owner; `None` for shared starter templates
    #[serde(default)]
    pub user_id: Option<Uuid>,
    /// Template name
    pub name: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
    /// Creation time
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A row of the `template_exercises` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateExercise {
    /// Unique identifier
    pub id: Uuid,
    /// Parent template
    pub template_id: Uuid,
    /// Referenced catalog exercise
    pub exercise_id: Uuid,
    /// Position within the template
    pub order_index: i32,
    /// Number of working sets planned
    pub target_sets: u32,
    /// Lower bound of the rep range
    #[serde(default)]
    pub target_reps_min: Option<u32>,
    /// Upper bound of the rep range
    #[serde(default)]
    pub target_reps_max: Option<u32>,
    /// Target rate of perceived exertion
    #[serde(default)]
    pub target_rpe: Option<f64>,
    /// Rest between sets in seconds
    #[serde(default)]
    pub rest_seconds: Option<u32>,
    /// Free-form notes
    #[serde(default)]
    pub notes: Option<String>,
}

impl TemplateExercise {
    /// Rep target as shown to the user: `"8-12"`, `"5"` or `"-"`
    #[must_use]
    pub fn target_reps_label(&self) -> String {
        reps_label(self.target_reps_min, self.target_reps_max)
    }
}

pub(crate) fn reps_label(min: Option<u32>, max: Option<u32>) -> String {
    match (min, max) {
        (Some(lo), Some(hi)) if lo != hi => format!("{lo}-{hi}"),
        (Some(n), _) | (None, Some(n)) => n.to_string(),
        (None, None) => "-".to_owned(),
    }
}

/// A template exercise joined with its catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateExerciseDetail {
    /// Template row
    pub target: TemplateExercise,
    /// Catalog entry, absent if the exercise was removed from the catalog
    pub exercise: Option<Exercise>,
}

/// A template with its exercises ordered by `order_index`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateWithExercises {
    /// Template header
    pub template: WorkoutTemplate,
    /// Ordered exercises
    pub exercises: Vec<TemplateExerciseDetail>,
}

impl TemplateWithExercises {
    /// Total planned working sets across all exercises
    #[must_use]
    pub fn total_target_sets(&self) -> u32 {
        self.exercises.iter().map(|e| e.target.target_sets).sum()
    }
}
