// ABOUTME: Core data models mirrored from the backend collections
// ABOUTME: Re-exports profile, exercise, template, workout, set and record types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gymtrack Contributors

//! # Data Models
//!
//! One Rust type per backend row plus the insert/patch payloads sent for it.
//! Row types deserialize leniently (`#[serde(default)]` on flags) because the
//! backend omits columns that still hold their database default.

mod exercise;
mod personal_record;
mod profile;
mod template;
mod units;
mod workout;

pub use exercise::Exercise;
pub use personal_record::{estimate_one_rep_max, PersonalRecord};
pub use profile::{NewProfile, Profile, ProfileUpdate};
pub use template::{TemplateExercise, TemplateExerciseDetail, TemplateWithExercises, WorkoutTemplate};
pub use units::WeightUnit;
pub use workout::{
    NewWorkout, NewWorkoutExercise, NewWorkoutSet, SetData, SetUpdate, Workout, WorkoutExercise,
    WorkoutSet, WorkoutStatus,
};
