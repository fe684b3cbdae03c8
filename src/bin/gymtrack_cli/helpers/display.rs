// ABOUTME: Output formatting helpers for gymtrack-cli
// ABOUTME: Prints templates, exercises, the active session, summaries, and history
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gymtrack Contributors

use chrono::Utc;
use gymtrack::database::TemplateSummary;
use gymtrack::models::{Exercise, Profile, WeightUnit, WorkoutSet};
use gymtrack::workout::{
    format_duration, ElapsedClock, HistoryEntry, WorkoutState, WorkoutStats, WorkoutSummary,
};

/// One set as a short line, e.g. `#2  100 kg x 5  (warmup)`
pub fn format_set(set: &WorkoutSet, unit: WeightUnit) -> String {
    let weight = set
        .data
        .weight
        .map_or_else(|| "bodyweight".to_owned(), |w| unit.format(w));
    let reps = set.data.reps.map_or_else(|| "-".to_owned(), |r| r.to_string());
    let mut line = format!("#{:<2} {weight} x {reps}", set.set_number);
    if let Some(rpe) = set.data.rpe {
        line.push_str(&format!(" @ RPE {rpe}"));
    }
    let mut flags = Vec::new();
    if set.data.is_warmup {
        flags.push("warmup");
    }
    if set.data.is_failure {
        flags.push("failure");
    }
    if set.data.is_dropset {
        flags.push("dropset");
    }
    if !flags.is_empty() {
        line.push_str(&format!("  ({})", flags.join(", ")));
    }
    line
}

pub fn display_templates(templates: &[TemplateSummary]) {
    if templates.is_empty() {
        println!("No templates yet.");
        return;
    }
    println!("{:<38} {:<28} {:>9} {:>5}", "ID", "NAME", "EXERCISES", "SETS");
    for summary in templates {
        println!(
            "{:<38} {:<28} {:>9} {:>5}",
            summary.template.id, summary.template.name, summary.exercise_count, summary.total_sets
        );
    }
}

pub fn display_exercises(exercises: &[Exercise]) {
    if exercises.is_empty() {
        println!("No matching exercises.");
        return;
    }
    for exercise in exercises {
        println!(
            "{}  {:<32} {:<12} {}",
            exercise.id,
            exercise.name,
            exercise.primary_muscle_group,
            exercise.equipment.as_deref().unwrap_or("-")
        );
    }
}

pub fn display_stats(stats: &WorkoutStats, unit: WeightUnit) {
    println!(
        "Sets: {}   Volume: {}   Exercises: {}   Time: {}",
        stats.total_sets,
        unit.format(stats.total_volume as f64),
        stats.exercises_with_sets,
        format_duration(stats.duration_secs)
    );
}

pub fn display_session(state: &WorkoutState, unit: WeightUnit) {
    let Some(workout) = &state.workout else {
        println!("No workout in progress.");
        return;
    };
    let clock = ElapsedClock::new(workout.started_at);
    println!("\n{}  [{}]", workout.name, clock.display(Utc::now()));
    println!("{}", "=".repeat(60));
    for (index, exercise) in state.exercises.iter().enumerate() {
        let slot = &exercise.workout_exercise;
        let swapped = if slot.is_substitution { " (swapped)" } else { "" };
        println!(
            "{}. {}{swapped}  target {} x {}",
            index + 1,
            exercise.name(),
            slot.target_sets,
            slot.target_reps_label()
        );
        for set in &exercise.sets {
            println!("     {}  [{}]", format_set(set, unit), set.id);
        }
    }
    println!("{}", "-".repeat(60));
    display_stats(&state.stats(), unit);
    if let Some(error) = &state.error {
        println!("Last error: {error}");
    }
}

pub fn display_summary(summary: &WorkoutSummary, unit: WeightUnit) {
    println!("\n{} ({})", summary.workout.name, summary.workout.status);
    println!("{}", "=".repeat(60));
    for exercise in &summary.exercises {
        let best = exercise
            .best_set
            .as_ref()
            .map_or_else(|| "-".to_owned(), |s| format_set(s, unit));
        println!(
            "{:<28} sets {:>2}   volume {:>10}   best {best}",
            exercise.name,
            exercise.working_sets,
            unit.format(exercise.volume as f64),
        );
    }
    println!("{}", "-".repeat(60));
    display_stats(&summary.stats, unit);
    if !summary.records.is_empty() {
        println!("\nPersonal records:");
        for record in &summary.records {
            println!("   {} x {}", unit.format(record.weight), record.reps);
        }
    }
}

pub fn display_history(entries: &[HistoryEntry], unit: WeightUnit) {
    if entries.is_empty() {
        println!("No completed workouts yet.");
        return;
    }
    for entry in entries {
        let date = entry
            .workout
            .completed_at
            .unwrap_or(entry.workout.started_at)
            .format("%Y-%m-%d");
        println!(
            "{date}  {:<28} {:>2} exercises  {:>3} sets  {:>10}  {}",
            entry.workout.name,
            entry.exercise_count,
            entry.stats.total_sets,
            unit.format(entry.stats.total_volume as f64),
            format_duration(entry.stats.duration_secs)
        );
    }
}

pub fn display_profile(profile: &Profile) {
    println!("Name:  {}", profile.name_or_email());
    println!("Email: {}", profile.email.as_deref().unwrap_or("-"));
    println!("Units: {}", profile.unit_preference);
}
