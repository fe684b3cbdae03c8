// ABOUTME: Account profile rows keyed by the identity service user id
// ABOUTME: Holds display name and unit preference plus insert/patch payloads
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gymtrack Contributors

use super::WeightUnit;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A row of the `profiles` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Same value as the identity user id
    pub id: Uuid,
    /// Email copied from the identity record
    #[serde(default)]
    pub email: Option<String>,
    /// Name shown in the app
    #[serde(default)]
    pub display_name: Option<String>,
    /// Unit weights are entered and shown in
    #[serde(default)]
    pub unit_preference: WeightUnit,
    /// Creation time
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Last profile edit
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Profile {
    /// Display name, falling back to the part of the email before `@`
    #[must_use]
    pub fn name_or_email(&self) -> &str {
        if let Some(name) = self.display_name.as_deref().filter(|n| !n.trim().is_empty()) {
            return name;
        }
        self.email
            .as_deref()
            .and_then(|email| email.split('@').next())
            .unwrap_or("Athlete")
    }
}

/// Payload inserted at sign-up
#[derive(Debug, Clone, Serialize)]
pub struct NewProfile {
    /// Identity user id
    pub id: Uuid,
    /// Account email
    pub email: String,
    /// Chosen display name
    pub display_name: Option<String>,
    /// Initial unit preference
    pub unit_preference: WeightUnit,
}

/// Partial update sent on profile edits
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    /// New display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// New unit preference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_preference: Option<WeightUnit>,
    /// Edit timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProfileUpdate {
    /// True when the update would change nothing
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.unit_preference.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_falls_back_to_email() {
        let profile: Profile = serde_json::from_value(serde_json::json!({
            "id": Uuid::new_v4(),
            "email": "sam@example.com",
            "display_name": "  ",
        }))
        .unwrap();
        assert_eq!(profile.name_or_email(), "sam");
        assert_eq!(profile.unit_preference, WeightUnit::Kg);
    }

    #[test]
    fn test_update_skips_unset_fields() {
        let update = ProfileUpdate {
            unit_preference: Some(WeightUnit::Lbs),
            ..ProfileUpdate::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({ "unit_preference": "lbs" }));
    }
}
