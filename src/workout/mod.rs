// ABOUTME: Active-workout module: session view-model, set input rows, rest timer, and summaries
// ABOUTME: Everything a screen needs while and after running a workout
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gymtrack Contributors

mod clock;
mod rest_timer;
mod session;
mod set_input;
mod stats;
mod summary;

pub use clock::{format_duration, ElapsedClock};
pub use rest_timer::{CompletionSignal, RestTimer, RestTimerEvent, RestTimerHandle};
pub use session::{ActiveExercise, ActiveWorkoutStore, SessionPhase, WorkoutState};
pub use set_input::{RowState, SetInputModel, SetInputRow};
pub use stats::WorkoutStats;
pub use summary::{history, ExerciseBreakdown, HistoryEntry, WorkoutSummary};
