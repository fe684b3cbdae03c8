// ABOUTME: Profile data access for display name and unit preference
// ABOUTME: Creates the profile row at sign-up and applies profile edits
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gymtrack Contributors

use crate::backend::{BackendExt, Query, SharedBackend};
use crate::constants::collections::PROFILES;
use crate::errors::{AppError, AppResult};
use crate::models::{NewProfile, Profile, ProfileUpdate};
use chrono::Utc;
use uuid::Uuid;

/// Access to the `profiles` collection
#[derive(Clone)]
pub struct ProfileManager {
    backend: SharedBackend,
}

impl ProfileManager {
    /// Create a manager over `backend`
    #[must_use]
    pub const fn new(backend: SharedBackend) -> Self {
        Self { backend }
    }

    /// Profile of `user_id`, if the row exists
    pub async fn get(&self, user_id: Uuid) -> AppResult<Option<Profile>> {
        self.backend
            .fetch_optional(&Query::table(PROFILES).eq("id", user_id))
            .await
    }

    /// Insert the profile row created at sign-up
    pub async fn create(&self, profile: &NewProfile) -> AppResult<Profile> {
        self.backend.insert_one(PROFILES, profile).await
    }

    /// Apply a profile edit and return the stored profile
    pub async fn update(&self, user_id: Uuid, update: &ProfileUpdate) -> AppResult<Profile> {
        if update.is_empty() {
            return Err(AppError::invalid_input("Nothing to update"));
        }
        if let Some(name) = &update.display_name {
            if name.trim().is_empty() {
                return Err(AppError::invalid_input("Display name cannot be empty"));
            }
        }
        let stamped = ProfileUpdate {
            updated_at: Some(Utc::now()),
            ..update.clone()
        };
        self.backend
            .patch_one(&Query::table(PROFILES).eq("id", user_id), &stamped, "Profile")
            .await
            .map_err(|e| e.with_user_id(user_id))
    }
}
