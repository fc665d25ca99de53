//! Log command: list recorded entries as a table.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Local, TimeZone, Utc};

use tmpo_core::{EntryFilter, ProjectName, TimeEntry, format_duration};
use tmpo_db::Database;

use super::util::{Period, format_time};

const HEADERS: [&str; 6] = ["ID", "START", "END", "DURATION", "PROJECT", "DESCRIPTION"];

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    limit: usize,
    project: Option<&str>,
    period: Period,
) -> Result<()> {
    let filter = EntryFilter {
        project: project.map(ProjectName::new).transpose()?,
        limit: Some(limit),
        ..period.filter(Local::now().date_naive())
    };
    let entries = db.list_entries(&filter)?;
    write!(writer, "{}", render(&entries, Utc::now(), &Local))?;
    Ok(())
}

/// Renders entries as an aligned table.
pub fn render<Tz: TimeZone>(entries: &[TimeEntry], now: DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    if entries.is_empty() {
        return "No time entries found.\n".to_string();
    }

    let rows: Vec<[String; 6]> = entries
        .iter()
        .map(|e| {
            [
                e.id.to_string(),
                format_time(e.start_time, tz),
                e.end_time
                    .map_or_else(|| "running".to_string(), |t| format_time(t, tz)),
                format_duration(e.duration_at(now)),
                e.project_name.to_string(),
                e.description.clone().unwrap_or_default(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header = HEADERS.map(String::from);
    for row in std::iter::once(&header).chain(&rows) {
        let line = row
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ");
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;

    fn ts(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn empty_log() {
        assert_snapshot!(render(&[], Utc::now(), &Utc), @"No time entries found.");
    }

    #[test]
    fn log_table_alignment() {
        let entries = vec![
            TimeEntry {
                id: 12,
                project_name: ProjectName::new("tmpo").unwrap(),
                start_time: ts("2025-01-02T13:00:00Z"),
                end_time: None,
                description: None,
            },
            TimeEntry {
                id: 3,
                project_name: ProjectName::new("client-site").unwrap(),
                start_time: ts("2025-01-02T09:00:00Z"),
                end_time: Some(ts("2025-01-02T10:30:00Z")),
                description: Some("landing page".to_string()),
            },
        ];
        let output = render(&entries, ts("2025-01-02T13:20:00Z"), &Utc);
        assert_snapshot!(output, @r"
        ID  START                END                  DURATION   PROJECT      DESCRIPTION
        12  2025-01-02 13:00:00  running              20m 0s     tmpo
        3   2025-01-02 09:00:00  2025-01-02 10:30:00  1h 30m 0s  client-site  landing page
        ");
    }

    #[test]
    fn log_command_respects_project_and_limit() {
        let db = Database::open_in_memory().unwrap();
        for (name, start, end) in [
            ("alpha", "2025-01-01T09:00:00Z", "2025-01-01T10:00:00Z"),
            ("beta", "2025-01-01T11:00:00Z", "2025-01-01T12:00:00Z"),
            ("alpha", "2025-01-01T13:00:00Z", "2025-01-01T14:00:00Z"),
        ] {
            db.create_manual_entry(&ProjectName::new(name).unwrap(), ts(start), ts(end), None)
                .unwrap();
        }

        let mut output = Vec::new();
        run(&mut output, &db, 1, Some("alpha"), Period::All).unwrap();
        let output = String::from_utf8(output).unwrap();
        assert_eq!(output.lines().count(), 2);
        assert!(output.lines().nth(1).unwrap().starts_with("3 "));
    }
}
