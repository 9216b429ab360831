// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Time truncation helpers shared by the window aggregator and scheduler.

use chrono::{DateTime, Datelike, Duration, TimeZone, Timelike, Utc};

/// Fixed rolling-window duration. Not user-tunable.
pub const WINDOW_DURATION: Duration = Duration::hours(5);

/// Zero seconds and below, leaving the minute untouched.
pub fn truncate_to_minute(t: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(t.year(), t.month(), t.day(), t.hour(), t.minute(), 0)
        .single()
        .unwrap_or(t)
}

/// Zero minutes and below, leaving the hour untouched.
pub fn truncate_to_hour(t: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(t.year(), t.month(), t.day(), t.hour(), 0, 0).single().unwrap_or(t)
}

/// Compute `window_end = truncate_to_hour(window_start + WINDOW_DURATION)`.
pub fn window_end_for(window_start: DateTime<Utc>) -> DateTime<Utc> {
    truncate_to_hour(window_start + WINDOW_DURATION)
}

#[cfg(test)]
#[path = "time_tests.rs"]
mod tests;
