// ABOUTME: Account commands for gymtrack-cli
// ABOUTME: Sign in, sign up, sign out, and view or edit the profile
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gymtrack Contributors

use gymtrack::client::GymtrackClient;
use gymtrack::errors::{AppError, AppResult};
use gymtrack::models::{ProfileUpdate, WeightUnit};
use tracing::info;

use crate::helpers::display::display_profile;

pub async fn sign_in(client: &GymtrackClient, email: &str, password: &str) -> AppResult<()> {
    let user = client.auth().sign_in(email, password).await?;
    info!(user_id = %user.id, "Signed in");
    println!("Signed in as {}", user.email.as_deref().unwrap_or(email));
    Ok(())
}

pub async fn sign_up(
    client: &GymtrackClient,
    email: &str,
    password: &str,
    name: Option<&str>,
) -> AppResult<()> {
    let user = client.auth().sign_up(email, password, name).await?;
    if client.auth().is_signed_in().await {
        println!("Account created and signed in as {email}");
    } else {
        println!("Account created for {email}. Confirm your email, then sign in.");
    }
    info!(user_id = %user.id, "Signed up");
    Ok(())
}

pub async fn sign_out(client: &GymtrackClient) -> AppResult<()> {
    if !client.auth().is_signed_in().await {
        println!("Not signed in.");
        return Ok(());
    }
    client.auth().sign_out().await?;
    println!("Signed out.");
    Ok(())
}

pub async fn whoami(client: &GymtrackClient) -> AppResult<()> {
    let state = client.auth().snapshot().await;
    match (state.user(), &state.profile) {
        (Some(_), Some(profile)) => display_profile(profile),
        (Some(user), None) => println!("Signed in as {} (no profile)", user.id),
        (None, _) => println!("Not signed in."),
    }
    Ok(())
}

pub async fn update_profile(
    client: &GymtrackClient,
    name: Option<String>,
    unit: Option<String>,
) -> AppResult<()> {
    let unit_preference = unit
        .map(|u| {
            WeightUnit::parse(&u)
                .ok_or_else(|| AppError::invalid_input(format!("Unknown unit '{u}', use kg or lbs")))
        })
        .transpose()?;
    let update = ProfileUpdate {
        display_name: name,
        unit_preference,
        updated_at: None,
    };
    if update.is_empty() {
        return Err(AppError::invalid_input("Nothing to update; pass --name or --unit"));
    }
    let profile = client.auth().update_profile(&update).await?;
    display_profile(&profile);
    Ok(())
}
