// ABOUTME: Per-collection data managers over the row-level backend
// ABOUTME: Bundles profile, exercise, template, workout and personal record access
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gymtrack Contributors

//! # Data Access Layer
//!
//! Each manager wraps one or a few backend collections and speaks model types.
//! They hold no state of their own: every call is one or more independent
//! request/response round trips, with no transaction spanning them.
//!
//! Failures are returned as `AppError`. Where a screen would rather show an
//! empty list than an error, managers offer `*_or_empty` variants that log the
//! failure and degrade.

mod exercises;
mod personal_records;
mod profiles;
mod templates;
mod workouts;

pub use exercises::ExerciseManager;
pub use personal_records::PersonalRecordManager;
pub use profiles::ProfileManager;
pub use templates::{TemplateManager, TemplateSummary};
pub use workouts::WorkoutManager;

use crate::backend::SharedBackend;

/// All data managers sharing one backend
#[derive(Clone)]
pub struct Database {
    backend: SharedBackend,
    /// `profiles`
    pub profiles: ProfileManager,
    /// `exercises`
    pub exercises: ExerciseManager,
    /// `workout_templates` and `template_exercises`
    pub templates: TemplateManager,
    /// `workouts`, `workout_exercises` and `workout_sets`
    pub workouts: WorkoutManager,
    /// `personal_records`
    pub records: PersonalRecordManager,
}

impl Database {
    /// Build every manager over `backend`
    #[must_use]
    pub fn new(backend: SharedBackend) -> Self {
        Self {
            profiles: ProfileManager::new(backend.clone()),
            exercises: ExerciseManager::new(backend.clone()),
            templates: TemplateManager::new(backend.clone()),
            workouts: WorkoutManager::new(backend.clone()),
            records: PersonalRecordManager::new(backend.clone()),
            backend,
        }
    }

    /// The underlying backend
    #[must_use]
    pub fn backend(&self) -> &SharedBackend {
        &self.backend
    }
}
