// ABOUTME: Catalog commands for gymtrack-cli
// ABOUTME: Lists templates and searches the exercise catalog
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gymtrack Contributors

use gymtrack::client::GymtrackClient;
use gymtrack::errors::AppResult;
use uuid::Uuid;

use crate::helpers::display::{display_exercises, display_templates};

pub async fn templates(client: &GymtrackClient) -> AppResult<()> {
    let user_id = client.auth().require_user_id().await?;
    let summaries = client.templates().summaries_for_user(user_id).await;
    display_templates(&summaries);
    Ok(())
}

pub async fn template_detail(client: &GymtrackClient, template_id: Uuid) -> AppResult<()> {
    let template = client.templates().get_with_exercises(template_id).await?;
    println!("{}", template.template.name);
    if let Some(description) = &template.template.description {
        println!("{description}");
    }
    for (index, detail) in template.exercises.iter().enumerate() {
        let name = detail
            .exercise
            .as_ref()
            .map_or("Unknown exercise", |e| e.name.as_str());
        println!(
            "{}. {name}  {} x {}",
            index + 1,
            detail.target.target_sets,
            detail.target.target_reps_label()
        );
    }
    Ok(())
}

pub async fn search(client: &GymtrackClient, query: &str, limit: Option<usize>) -> AppResult<()> {
    let exercises = client.exercises().search(query, limit).await?;
    display_exercises(&exercises);
    Ok(())
}

pub async fn by_muscle(client: &GymtrackClient, muscle: &str) -> AppResult<()> {
    let exercises = client.exercises().by_muscle_group(muscle).await?;
    display_exercises(&exercises);
    Ok(())
}

pub async fn alternatives(client: &GymtrackClient, exercise_id: Uuid) -> AppResult<()> {
    let exercises = client.exercises().alternatives_for(exercise_id).await?;
    display_exercises(&exercises);
    Ok(())
}
