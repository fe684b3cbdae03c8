// ABOUTME: Review commands for gymtrack-cli
// ABOUTME: Post-workout summary and completed workout history
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gymtrack Contributors

use gymtrack::client::GymtrackClient;
use gymtrack::errors::AppResult;
use uuid::Uuid;

use crate::helpers::display::{display_history, display_summary};
use crate::helpers::session::weight_unit;

pub async fn summary(client: &GymtrackClient, workout_id: Uuid) -> AppResult<()> {
    let summary = client.summary(workout_id).await?;
    display_summary(&summary, weight_unit(client).await);
    Ok(())
}

pub async fn history(client: &GymtrackClient, limit: usize) -> AppResult<()> {
    let entries = client.history(limit).await?;
    display_history(&entries, weight_unit(client).await);
    Ok(())
}
