// ABOUTME: Personal records derived by the backend from logged sets
// ABOUTME: Read-only on the client, shown in workout summaries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gymtrack Contributors

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A row of the `personal_records` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalRecord {
    /// Unique identifier
    pub id: Uuid,
    /// Owner
    pub user_id: Uuid,
    /// Exercise the record was set on
    pub exercise_id: Uuid,
    /// Workout the record was set in
    #[serde(default)]
    pub workout_id: Option<Uuid>,
    /// Weight lifted
    pub weight: f64,
    /// Repetitions performed
    pub reps: u32,
    /// Estimated one-rep max, when the backend computed one
    #[serde(default)]
    pub estimated_one_rep_max: Option<f64>,
    /// When the record was achieved
    pub achieved_at: DateTime<Utc>,
}

impl PersonalRecord {
    /// Backend estimate, or the Epley estimate when absent
    #[must_use]
    pub fn one_rep_max(&self) -> f64 {
        self.estimated_one_rep_max
            .unwrap_or_else(|| estimate_one_rep_max(self.weight, self.reps))
    }
}

/// Epley one-rep-max estimate; a single rep is its own max
#[must_use]
pub fn estimate_one_rep_max(weight: f64, reps: u32) -> f64 {
    match reps {
        0 => 0.0,
        1 => weight,
        n => weight * (1.0 + f64::from(n) / 30.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epley_estimate() {
        assert!((estimate_one_rep_max(100.0, 1) - 100.0).abs() < f64::EPSILON);
        assert!((estimate_one_rep_max(100.0, 10) - 133.333).abs() < 0.01);
        assert!(estimate_one_rep_max(100.0, 0).abs() < f64::EPSILON);
    }
}
