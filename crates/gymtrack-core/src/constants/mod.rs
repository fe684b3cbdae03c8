// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Backend collection names, timer settings, and client defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gymtrack Contributors

//! Constants grouped by domain.

/// Backend collection (table) names
pub mod collections {
    /// User profiles keyed by identity user id
    pub const PROFILES: &str = "profiles";
    /// Exercise catalog
    pub const EXERCISES: &str = "exercises";
    /// Workout templates
    pub const WORKOUT_TEMPLATES: &str = "workout_templates";
    /// Ordered exercises of a template
    pub const TEMPLATE_EXERCISES: &str = "template_exercises";
    /// Workout sessions
    pub const WORKOUTS: &str = "workouts";
    /// Exercises instantiated into a session
    pub const WORKOUT_EXERCISES: &str = "workout_exercises";
    /// Logged sets
    pub const WORKOUT_SETS: &str = "workout_sets";
    /// Personal records written by the backend
    pub const PERSONAL_RECORDS: &str = "personal_records";
}

/// Backend endpoint paths
pub mod endpoints {
    /// Row-level data API prefix
    pub const REST_PREFIX: &str = "/rest/v1";
    /// Identity API prefix
    pub const AUTH_PREFIX: &str = "/auth/v1";
}

/// Rest timer settings
pub mod timer {
    /// Countdown tick interval in seconds
    pub const TICK_SECS: u64 = 1;
    /// Step applied by the +/- adjustment buttons
    pub const ADJUST_STEP_SECS: i64 = 15;
    /// Rest duration used when a slot has no target
    pub const DEFAULT_REST_SECS: u64 = 90;
}

/// Session refresh settings
pub mod session {
    /// Refresh when the access token expires within this window
    pub const REFRESH_MARGIN_SECS: i64 = 60;
    /// How often the foreground auto-refresh task checks expiry
    pub const REFRESH_INTERVAL_SECS: u64 = 30;
    /// Session file name under the config directory
    pub const SESSION_FILE_NAME: &str = "session.json";
    /// Application directory name
    pub const APP_DIR_NAME: &str = "gymtrack";
}

/// Default limits
pub mod limits {
    /// Default number of workouts returned by history
    pub const DEFAULT_HISTORY_LIMIT: usize = 20;
    /// Maximum number of results for exercise search
    pub const MAX_EXERCISE_SEARCH_RESULTS: usize = 50;
}

/// Unit conversion constants
pub mod units {
    /// Pounds per kilogram
    pub const LBS_PER_KG: f64 = 2.204_622_621_8;
}

/// Service identification used in logs
pub mod service_names {
    /// Client library name
    pub const GYMTRACK_CLIENT: &str = "gymtrack";
}
