//! Shared utilities for CLI commands.

use std::sync::LazyLock;

use anyhow::Context;
use chrono::{
    DateTime, Datelike, Duration, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime,
    TimeZone, Utc,
};
use regex::Regex;

use tmpo_core::EntryFilter;

/// Pre-compiled regex for relative time parsing.
static RELATIVE_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s+(minute|hour|day|week)s?\s+ago$").unwrap());

/// Conservative bounds for relative time parsing (~1000 years in minutes).
const MAX_RELATIVE_MINUTES: i64 = 1000 * 365 * 24 * 60;

/// Local wall-clock formats accepted by [`parse_datetime`].
const LOCAL_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

/// Parse a datetime string as ISO 8601, local wall-clock time, or relative time.
///
/// Supports:
/// - ISO 8601: "2026-01-15T10:30:00Z"
/// - Local: "2026-01-15 10:30" or "2026-01-15 10:30:00"
/// - Relative: "2 hours ago", "30 minutes ago", "1 day ago", "1 week ago"
pub fn parse_datetime(s: &str) -> anyhow::Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in LOCAL_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return local_to_utc(naive)
                .with_context(|| format!("{s} does not exist in the local timezone"));
        }
    }

    let Some(caps) = RELATIVE_TIME_RE.captures(s) else {
        anyhow::bail!(
            "Invalid datetime: {s}. Use ISO 8601 (e.g., 2026-01-15T10:30:00Z), local time (e.g., '2026-01-15 10:30') or relative (e.g., '2 hours ago')"
        );
    };

    let n: i64 = caps[1]
        .parse()
        .context("failed to parse number in relative time")?;

    let (max_for_unit, minutes_per_unit) = match &caps[2] {
        "minute" => (MAX_RELATIVE_MINUTES, 1),
        "hour" => (MAX_RELATIVE_MINUTES / 60, 60),
        "day" => (MAX_RELATIVE_MINUTES / (60 * 24), 60 * 24),
        "week" => (MAX_RELATIVE_MINUTES / (60 * 24 * 7), 60 * 24 * 7),
        unit => anyhow::bail!("Unknown time unit: {unit}"),
    };

    if n > max_for_unit {
        anyhow::bail!("Relative time value too large: {n} {}", &caps[2]);
    }

    let duration = Duration::minutes(n * minutes_per_unit);
    Ok(Utc::now() - duration)
}

/// Converts local wall-clock time to UTC.
/// Handles DST ambiguity by picking the earlier time; gaps yield `None`.
fn local_to_utc(naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Some(dt.with_timezone(&Utc)),
        LocalResult::None => None,
    }
}

/// Converts a local date at midnight to UTC.
fn local_midnight_to_utc(local_date: NaiveDate) -> DateTime<Utc> {
    local_to_utc(local_date.and_time(NaiveTime::MIN)).unwrap_or_else(|| {
        // DST spring-forward gap at midnight is rare but possible
        // Use 1am local which is guaranteed to exist
        let one_am = local_date.and_time(NaiveTime::from_hms_opt(1, 0, 0).unwrap_or(NaiveTime::MIN));
        local_to_utc(one_am).unwrap_or_else(|| Utc.from_utc_datetime(&one_am))
    })
}

/// Reporting window for history commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    All,
    Today,
    Week,
}

impl Period {
    /// Half-open `[start, end)` boundaries in UTC for the local date `today`.
    pub fn boundaries(self, today: NaiveDate) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        match self {
            Self::All => None,
            Self::Today => Some((
                local_midnight_to_utc(today),
                local_midnight_to_utc(today + Duration::days(1)),
            )),
            Self::Week => {
                let days_since_monday = today.weekday().num_days_from_monday();
                let monday = today - Duration::days(i64::from(days_since_monday));
                Some((
                    local_midnight_to_utc(monday),
                    local_midnight_to_utc(monday + Duration::days(7)),
                ))
            }
        }
    }

    /// Human-readable label used in report headers.
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "all time",
            Self::Today => "today",
            Self::Week => "this week",
        }
    }

    /// Builds an entry filter restricted to this period.
    pub fn filter(self, today: NaiveDate) -> EntryFilter {
        let (since, until) = self.boundaries(today).unzip();
        EntryFilter {
            since,
            until,
            ..EntryFilter::default()
        }
    }
}

/// Formats a timestamp as wall-clock time in `tz`.
pub fn format_time<Tz: TimeZone>(timestamp: DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    timestamp
        .with_timezone(tz)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}
