// ABOUTME: Exercise catalog entries, read-only from the client
// ABOUTME: Muscle groups, equipment and compound flag drive filtering and swaps
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gymtrack Contributors

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A row of the `exercises` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    /// Unique identifier
    pub id: Uuid,
    /// Exercise name
    pub name: String,
    /// Main muscle group worked
    pub primary_muscle_group: String,
    /// Other muscle groups involved
    #[serde(default)]
    pub secondary_muscle_groups: Vec<String>,
    /// Equipment type (barbell, dumbbell, cable, machine, bodyweight...)
    #[serde(default)]
    pub equipment: Option<String>,
    /// Multi-joint movement
    #[serde(default)]
    pub is_compound: bool,
    /// Optional coaching notes
    #[serde(default)]
    pub instructions: Option<String>,
}

impl Exercise {
    /// Whether the exercise trains `muscle` as a primary or secondary group
    #[must_use]
    pub fn works(&self, muscle: &str) -> bool {
        self.primary_muscle_group.eq_ignore_ascii_case(muscle)
            || self
                .secondary_muscle_groups
                .iter()
                .any(|m| m.eq_ignore_ascii_case(muscle))
    }

    /// Case-insensitive substring match on the name
    #[must_use]
    pub fn matches_name(&self, query: &str) -> bool {
        self.name.to_lowercase().contains(&query.trim().to_lowercase())
    }
}
