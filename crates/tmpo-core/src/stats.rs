//! Aggregated per-project totals.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::{ProjectName, TimeEntry};

/// Total tracked time for one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectStats {
    pub project: ProjectName,
    pub entries: usize,
    pub total: Duration,
}

/// Sums entry durations per project.
///
/// Running entries count up to `now`. Results are sorted by total time
/// descending, then by project name.
pub fn summarize(entries: &[TimeEntry], now: DateTime<Utc>) -> Vec<ProjectStats> {
    let mut totals: HashMap<&ProjectName, (usize, Duration)> = HashMap::new();
    for entry in entries {
        let slot = totals
            .entry(&entry.project_name)
            .or_insert((0, Duration::zero()));
        slot.0 += 1;
        slot.1 += entry.duration_at(now);
    }

    let mut stats: Vec<ProjectStats> = totals
        .into_iter()
        .map(|(project, (entries, total))| ProjectStats {
            project: project.clone(),
            entries,
            total,
        })
        .collect();
    stats.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.project.cmp(&b.project)));
    stats
}

/// Sum of all totals.
pub fn grand_total(stats: &[ProjectStats]) -> Duration {
    stats.iter().fold(Duration::zero(), |acc, s| acc + s.total)
}

/// Formats a duration as `Xh Ym Zs`, dropping leading zero units.
/// Negative durations are shown as `0s`.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.num_seconds().max(0);
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m {seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn entry(id: i64, project: &str, start: &str, end: Option<&str>) -> TimeEntry {
        TimeEntry {
            id,
            project_name: ProjectName::new(project).unwrap(),
            start_time: ts(start),
            end_time: end.map(ts),
            description: None,
        }
    }

    #[test]
    fn summarize_groups_and_sorts_by_total() {
        let entries = vec![
            entry(1, "alpha", "2025-01-01T09:00:00Z", Some("2025-01-01T09:30:00Z")),
            entry(2, "beta", "2025-01-01T10:00:00Z", Some("2025-01-01T12:00:00Z")),
            entry(3, "alpha", "2025-01-01T13:00:00Z", Some("2025-01-01T13:15:00Z")),
        ];
        let stats = summarize(&entries, ts("2025-01-02T00:00:00Z"));

        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].project.as_str(), "beta");
        assert_eq!(stats[0].total, Duration::hours(2));
        assert_eq!(stats[1].project.as_str(), "alpha");
        assert_eq!(stats[1].entries, 2);
        assert_eq!(stats[1].total, Duration::minutes(45));
        assert_eq!(grand_total(&stats), Duration::minutes(165));
    }

    #[test]
    fn summarize_counts_running_entry_to_now() {
        let entries = vec![entry(1, "alpha", "2025-01-01T09:00:00Z", None)];
        let stats = summarize(&entries, ts("2025-01-01T09:10:00Z"));
        assert_eq!(stats[0].total, Duration::minutes(10));
    }

    #[test]
    fn ties_sorted_by_name() {
        let entries = vec![
            entry(1, "zeta", "2025-01-01T09:00:00Z", Some("2025-01-01T10:00:00Z")),
            entry(2, "eta", "2025-01-01T10:00:00Z", Some("2025-01-01T11:00:00Z")),
        ];
        let stats = summarize(&entries, ts("2025-01-02T00:00:00Z"));
        assert_eq!(stats[0].project.as_str(), "eta");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::seconds(0)), "0s");
        assert_eq!(format_duration(Duration::seconds(59)), "59s");
        assert_eq!(format_duration(Duration::seconds(61)), "1m 1s");
        assert_eq!(format_duration(Duration::seconds(3600)), "1h 0m 0s");
        assert_eq!(format_duration(Duration::seconds(9_015)), "2h 30m 15s");
        assert_eq!(format_duration(Duration::seconds(-5)), "0s");
    }
}
