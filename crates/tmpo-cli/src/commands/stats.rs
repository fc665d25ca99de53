//! Stats command: time totals per project.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use chrono::{Local, Utc};

use tmpo_core::{ProjectStats, format_duration, grand_total, summarize};
use tmpo_db::Database;

use super::util::Period;

pub fn run<W: Write>(writer: &mut W, db: &Database, period: Period) -> Result<()> {
    let entries = db.list_entries(&period.filter(Local::now().date_naive()))?;
    let stats = summarize(&entries, Utc::now());
    write!(writer, "{}", render(&stats, period))?;
    Ok(())
}

/// Renders per-project totals followed by the overall total.
pub fn render(stats: &[ProjectStats], period: Period) -> String {
    let mut out = String::new();
    writeln!(out, "Time stats ({})", period.label()).unwrap();

    if stats.is_empty() {
        writeln!(out, "No time entries found.").unwrap();
        return out;
    }

    let name_width = stats
        .iter()
        .map(|s| s.project.as_str().chars().count())
        .chain(std::iter::once("Total".len()))
        .max()
        .unwrap_or_default();
    let durations: Vec<String> = stats.iter().map(|s| format_duration(s.total)).collect();
    let total = format_duration(grand_total(stats));
    let duration_width = durations
        .iter()
        .chain(std::iter::once(&total))
        .map(String::len)
        .max()
        .unwrap_or_default();

    for (s, duration) in stats.iter().zip(&durations) {
        let noun = if s.entries == 1 { "entry" } else { "entries" };
        writeln!(
            out,
            "  {:<name_width$}  {duration:>duration_width$}  ({} {noun})",
            s.project.as_str(),
            s.entries,
        )
        .unwrap();
    }
    writeln!(out, "  {:<name_width$}  {total:>duration_width$}", "Total").unwrap();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::DateTime;
    use insta::assert_snapshot;
    use tmpo_core::ProjectName;

    fn ts(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn stats_without_entries() {
        assert_snapshot!(render(&[], Period::Today), @r"
        Time stats (today)
        No time entries found.
        ");
    }

    #[test]
    fn stats_sums_per_project() {
        let db = Database::open_in_memory().unwrap();
        for (name, start, end) in [
            ("alpha", "2025-01-01T09:00:00Z", "2025-01-01T09:30:00Z"),
            ("website", "2025-01-01T10:00:00Z", "2025-01-01T12:00:00Z"),
            ("alpha", "2025-01-01T13:00:00Z", "2025-01-01T13:15:00Z"),
        ] {
            db.create_manual_entry(&ProjectName::new(name).unwrap(), ts(start), ts(end), None)
                .unwrap();
        }
        let entries = db.list_entries(&tmpo_core::EntryFilter::default()).unwrap();
        let stats = summarize(&entries, ts("2025-01-02T00:00:00Z"));

        assert_snapshot!(render(&stats, Period::All), @r"
        Time stats (all time)
          website   2h 0m 0s  (1 entry)
          alpha       45m 0s  (2 entries)
          Total    2h 45m 0s
        ");
    }
}
