// ABOUTME: Weight unit preference with conversion and display helpers
// ABOUTME: Stored on the profile as "kg" or "lbs"
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gymtrack Contributors

use crate::constants::units::LBS_PER_KG;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unit a user enters and reads weights in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    /// Kilograms
    #[default]
    Kg,
    /// Pounds
    Lbs,
}

impl WeightUnit {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Kg => "kg",
            Self::Lbs => "lbs",
        }
    }

    /// Parse from a user or database string
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "kg" | "kgs" | "kilograms" => Some(Self::Kg),
            "lb" | "lbs" | "pounds" => Some(Self::Lbs),
            _ => None,
        }
    }

    /// Convert a weight expressed in `self` into `target`
    #[must_use]
    pub fn convert(self, value: f64, target: Self) -> f64 {
        match (self, target) {
            (Self::Kg, Self::Lbs) => value * LBS_PER_KG,
            (Self::Lbs, Self::Kg) => value / LBS_PER_KG,
            _ => value,
        }
    }

    /// Format a weight with one decimal at most, e.g. `"102.5 kg"` or `"100 kg"`
    #[must_use]
    pub fn format(self, value: f64) -> String {
        let rounded = (value * 10.0).round() / 10.0;
        if rounded.fract() == 0.0 {
            format!("{rounded:.0} {self}")
        } else {
            format!("{rounded:.1} {self}")
        }
    }
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
