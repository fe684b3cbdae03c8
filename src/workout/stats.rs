// ABOUTME: Aggregate statistics over a session's logged sets
// ABOUTME: Counts working sets and sums weight x reps volume, rounded to the nearest unit
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gymtrack Contributors

use crate::models::WorkoutSet;
use serde::Serialize;

/// Totals shown during and after a session
///
/// Warmup sets are excluded everywhere. Volume only counts sets that have
/// both weight and reps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WorkoutStats {
    /// Number of working sets
    pub total_sets: usize,
    /// Sum of weight x reps, rounded
    pub total_volume: u64,
    /// Slots with at least one working set
    pub exercises_with_sets: usize,
    /// Elapsed or total session time in seconds
    pub duration_secs: u64,
}

impl WorkoutStats {
    /// Aggregate per-slot set lists
    pub fn from_groups<'a, I>(groups: I, duration_secs: u64) -> Self
    where
        I: IntoIterator<Item = &'a [WorkoutSet]>,
    {
        let mut total_sets = 0;
        let mut exercises_with_sets = 0;
        let mut volume = 0.0_f64;

        for sets in groups {
            let working = sets.iter().filter(|s| s.is_working()).count();
            if working > 0 {
                exercises_with_sets += 1;
            }
            total_sets += working;
            volume += sets.iter().filter_map(WorkoutSet::volume).sum::<f64>();
        }

        Self {
            total_sets,
            total_volume: volume.max(0.0).round() as u64,
            exercises_with_sets,
            duration_secs,
        }
    }
}
