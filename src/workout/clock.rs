// ABOUTME: Elapsed session time and duration formatting
// ABOUTME: Formats seconds as M:SS below an hour and H:MM:SS above
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gymtrack Contributors

use chrono::{DateTime, Utc};

/// Elapsed time since a session started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElapsedClock {
    started_at: DateTime<Utc>,
}

impl ElapsedClock {
    /// Clock counting from `started_at`
    #[must_use]
    pub const fn new(started_at: DateTime<Utc>) -> Self {
        Self { started_at }
    }

    /// Whole seconds elapsed at `now`; zero if `now` precedes the start
    #[must_use]
    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> u64 {
        u64::try_from((now - self.started_at).num_seconds()).unwrap_or(0)
    }

    /// Elapsed time at `now`, formatted for display
    #[must_use]
    pub fn display(&self, now: DateTime<Utc>) -> String {
        format_duration(self.elapsed_secs(now))
    }
}

/// `M:SS` below one hour, `H:MM:SS` from one hour on
#[must_use]
pub fn format_duration(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(75), "1:15");
        assert_eq!(format_duration(3599), "59:59");
        assert_eq!(format_duration(3600), "1:00:00");
        assert_eq!(format_duration(3725), "1:02:05");
    }

    #[test]
    fn test_clock_never_negative() {
        let start = Utc::now();
        let clock = ElapsedClock::new(start);
        assert_eq!(clock.elapsed_secs(start - Duration::seconds(5)), 0);
        assert_eq!(clock.display(start + Duration::seconds(61)), "1:01");
    }
}
