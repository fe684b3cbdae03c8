// ABOUTME: Workout sessions, their instantiated exercises, and logged sets
// ABOUTME: Includes lifecycle status and insert/patch payloads for each row type
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gymtrack Contributors

use super::template::reps_label;
use super::TemplateExercise;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Lifecycle status of a workout row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutStatus {
    /// Session currently being performed
    #[default]
    InProgress,
    /// Finished normally
    Completed,
    /// Given up before finishing
    Abandoned,
}

impl WorkoutStatus {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Abandoned => "abandoned",
        }
    }

    /// Whether the session has been closed
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self, Self::Completed | Self::Abandoned)
    }
}

impl fmt::Display for WorkoutStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row of the `workouts` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    /// Unique identifier
    pub id: Uuid,
    /// Owner
    pub user_id: Uuid,
    /// Template the session was started from
    #[serde(default)]
    pub template_id: Option<Uuid>,
    /// Session name, copied from the template
    pub name: String,
    /// Lifecycle status
    pub status: WorkoutStatus,
    /// Start time
    pub started_at: DateTime<Utc>,
    /// Completion or abandon time
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    /// Free-form notes
    #[serde(default)]
    pub notes: Option<String>,
}

impl Workout {
    /// Seconds between start and `completed_at`, or `now` while still open
    #[must_use]
    pub fn duration_secs(&self, now: DateTime<Utc>) -> u64 {
        let end = self.completed_at.unwrap_or(now);
        u64::try_from((end - self.started_at).num_seconds()).unwrap_or(0)
    }
}

/// Payload inserted when a session starts
#[derive(Debug, Clone, Serialize)]
pub struct NewWorkout {
    /// Owner
    pub user_id: Uuid,
    /// Source template
    pub template_id: Option<Uuid>,
    /// Session name
    pub name: String,
    /// Always `in_progress` at creation
    pub status: WorkoutStatus,
    /// Start time
    pub started_at: DateTime<Utc>,
}

/// A row of the `workout_exercises` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutExercise {
    /// Unique identifier
    pub id: Uuid,
    /// Parent session
    pub workout_id: Uuid,
    /// Current exercise reference (replaced in place on swap)
    pub exercise_id: Uuid,
    /// Position within the session
    pub order_index: i32,
    /// Planned working sets
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
    /// Whether the slot's exercise was swapped
    #[serde(default)]
    pub is_substitution: bool,
    /// Exercise the slot was seeded with, set on first swap
    #[serde(default)]
    pub original_exercise_id: Option<Uuid>,
}

impl WorkoutExercise {
    /// Rep target label, e.g. `"8-12"`
    #[must_use]
    pub fn target_reps_label(&self) -> String {
        reps_label(self.target_reps_min, self.target_reps_max)
    }
}

/// Payload inserted for each template exercise when a session starts
#[derive(Debug, Clone, Serialize)]
pub struct NewWorkoutExercise {
    /// Parent session
    pub workout_id: Uuid,
    /// Exercise reference
    pub exercise_id: Uuid,
    /// Position
    pub order_index: i32,
    /// Planned working sets
    pub target_sets: u32,
    /// Lower bound of the rep range
    pub target_reps_min: Option<u32>,
    /// Upper bound of the rep range
    pub target_reps_max: Option<u32>,
    /// Target RPE
    pub target_rpe: Option<f64>,
    /// Rest between sets in seconds
    pub rest_seconds: Option<u32>,
    /// Always false at creation
    pub is_substitution: bool,
}

impl NewWorkoutExercise {
    /// Copy targets from a template exercise into a session slot
    #[must_use]
    pub fn from_template(workout_id: Uuid, target: &TemplateExercise) -> Self {
        Self {
            workout_id,
            exercise_id: target.exercise_id,
            order_index: target.order_index,
            target_sets: target.target_sets,
            target_reps_min: target.target_reps_min,
            target_reps_max: target.target_reps_max,
            target_rpe: target.target_rpe,
            rest_seconds: target.rest_seconds,
            is_substitution: false,
        }
    }
}

/// Values entered for one set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetData {
    /// Weight lifted
    pub weight: Option<f64>,
    /// Repetitions performed
    pub reps: Option<u32>,
    /// Perceived exertion
    #[serde(default)]
    pub rpe: Option<f64>,
    /// Warmup sets do not count toward volume or records
    #[serde(default)]
    pub is_warmup: bool,
    /// Set taken to failure
    #[serde(default)]
    pub is_failure: bool,
    /// Drop set
    #[serde(default)]
    pub is_dropset: bool,
}

impl SetData {
    /// A working set with weight and reps
    #[must_use]
    pub const fn working(weight: f64, reps: u32) -> Self {
        Self {
            weight: Some(weight),
            reps: Some(reps),
            rpe: None,
            is_warmup: false,
            is_failure: false,
            is_dropset: false,
        }
    }

    /// A warmup set with weight and reps
    #[must_use]
    pub const fn warmup(weight: f64, reps: u32) -> Self {
        Self {
            is_warmup: true,
            ..Self::working(weight, reps)
        }
    }
}

/// A row of the `workout_sets` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSet {
    /// Unique identifier
    pub id: Uuid,
    /// Parent session slot
    pub workout_exercise_id: Uuid,
    /// 1-based position, dense within the slot
    pub set_number: u32,
    /// Logged values
    #[serde(flatten)]
    pub data: SetData,
    /// Insert time
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl WorkoutSet {
    /// Non-warmup sets count toward statistics
    #[must_use]
    pub const fn is_working(&self) -> bool {
        !self.data.is_warmup
    }

    /// weight x reps for working sets with both fields present
    #[must_use]
    pub fn volume(&self) -> Option<f64> {
        if !self.is_working() {
            return None;
        }
        match (self.data.weight, self.data.reps) {
            (Some(weight), Some(reps)) => Some(weight * f64::from(reps)),
            _ => None,
        }
    }
}

/// Payload inserted by `log_set`
#[derive(Debug, Clone, Serialize)]
pub struct NewWorkoutSet {
    /// Parent session slot
    pub workout_exercise_id: Uuid,
    /// Position assigned by the client
    pub set_number: u32,
    /// Logged values
    #[serde(flatten)]
    pub data: SetData,
}

/// Partial update of a logged set
///
/// Nullable columns use `Option<Option<_>>`: `None` leaves the column alone,
/// `Some(None)` clears it and `Some(Some(v))` sets it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SetUpdate {
    /// New weight
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<Option<f64>>,
    /// New reps
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reps: Option<Option<u32>>,
    /// New RPE
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpe: Option<Option<f64>>,
    /// New warmup flag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_warmup: Option<bool>,
    /// New failure flag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_failure: Option<bool>,
    /// New dropset flag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_dropset: Option<bool>,
    /// New position, only written when a slot is renumbered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set_number: Option<u32>,
}

impl SetUpdate {
    /// Update that only moves a set to a new position
    #[must_use]
    pub fn renumber(set_number: u32) -> Self {
        Self {
            set_number: Some(set_number),
            ..Self::default()
        }
    }

    /// Update replacing every value with `data`, clearing the ones it lacks
    #[must_use]
    pub const fn from_data(data: &SetData) -> Self {
        Self {
            weight: Some(data.weight),
            reps: Some(data.reps),
            rpe: Some(data.rpe),
            is_warmup: Some(data.is_warmup),
            is_failure: Some(data.is_failure),
            is_dropset: Some(data.is_dropset),
            set_number: None,
        }
    }

    /// Value the weight column takes after the update, if it is written
    #[must_use]
    pub fn new_weight(&self) -> Option<f64> {
        self.weight.flatten()
    }

    /// Value the RPE column takes after the update, if it is written
    #[must_use]
    pub fn new_rpe(&self) -> Option<f64> {
        self.rpe.flatten()
    }

    /// Apply the patch to a locally held set
    pub fn apply_to(&self, set: &mut WorkoutSet) {
        if let Some(weight) = self.weight {
            set.data.weight = weight;
        }
        if let Some(reps) = self.reps {
            set.data.reps = reps;
        }
        if let Some(rpe) = self.rpe {
            set.data.rpe = rpe;
        }
        if let Some(flag) = self.is_warmup {
            set.data.is_warmup = flag;
        }
        if let Some(flag) = self.is_failure {
            set.data.is_failure = flag;
        }
        if let Some(flag) = self.is_dropset {
            set.data.is_dropset = flag;
        }
        if let Some(number) = self.set_number {
            set.set_number = number;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn set(data: SetData) -> WorkoutSet {
        WorkoutSet {
            id: Uuid::new_v4(),
            workout_exercise_id: Uuid::new_v4(),
            set_number: 1,
            data,
            created_at: None,
        }
    }

    #[test]
    fn test_volume_ignores_warmups_and_missing_fields() {
        assert_eq!(set(SetData::working(100.0, 5)).volume(), Some(500.0));
        assert_eq!(set(SetData::warmup(60.0, 10)).volume(), None);
        let partial = SetData {
            weight: Some(80.0),
            ..SetData::default()
        };
        assert_eq!(set(partial).volume(), None);
    }

    #[test]
    fn test_set_row_deserializes_flat_columns() {
        let row = json!({
            "id": Uuid::new_v4(),
            "workout_exercise_id": Uuid::new_v4(),
            "set_number": 2,
            "weight": 62.5,
            "reps": 8,
            "is_warmup": false,
            "is_failure": true
        });
        let parsed: WorkoutSet = serde_json::from_value(row).unwrap();
        assert_eq!(parsed.set_number, 2);
        assert_eq!(parsed.data.weight, Some(62.5));
        assert!(parsed.data.is_failure);
        assert!(!parsed.data.is_dropset);
    }

    #[test]
    fn test_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(WorkoutStatus::InProgress).unwrap(),
            json!("in_progress")
        );
        assert!(WorkoutStatus::Abandoned.is_closed());
        assert!(!WorkoutStatus::InProgress.is_closed());
    }

    #[test]
    fn test_update_applies_only_present_fields() {
        let mut logged = set(SetData::working(100.0, 5));
        SetUpdate {
            reps: Some(Some(6)),
            ..SetUpdate::default()
        }
        .apply_to(&mut logged);
        assert_eq!(logged.data.weight, Some(100.0));
        assert_eq!(logged.data.reps, Some(6));
    }

    #[test]
    fn test_update_from_data_clears_missing_values() {
        let cleared = SetData {
            reps: Some(8),
            ..SetData::default()
        };
        let update = SetUpdate::from_data(&cleared);
        let body = serde_json::to_value(&update).unwrap();
        assert_eq!(body["weight"], Value::Null);
        assert_eq!(body["rpe"], Value::Null);
        assert_eq!(body["reps"], json!(8));
        assert!(body.get("set_number").is_none());

        let mut logged = set(SetData::working(100.0, 5));
        update.apply_to(&mut logged);
        assert_eq!(logged.data.weight, None);
        assert_eq!(logged.data.reps, Some(8));
    }

    #[test]
    fn test_partial_update_omits_untouched_columns() {
        let body = serde_json::to_value(SetUpdate {
            rpe: Some(Some(8.0)),
            ..SetUpdate::default()
        })
        .unwrap();
        assert_eq!(body, json!({ "rpe": 8.0 }));
    }
}
