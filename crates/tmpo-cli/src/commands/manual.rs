//! Manual command: record a finished entry after the fact.

use std::io::Write;

use anyhow::{Context, Result};

use tmpo_core::{ProjectName, TimeEntry, format_duration};
use tmpo_db::Database;

use super::util::parse_datetime;

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    project: &str,
    start: &str,
    end: &str,
    description: Option<&str>,
) -> Result<TimeEntry> {
    let project = ProjectName::new(project)?;
    let start = parse_datetime(start).context("invalid --start")?;
    let end = parse_datetime(end).context("invalid --end")?;

    let entry = db.create_manual_entry(&project, start, end, description)?;
    let duration = entry.duration_at(end);
    writeln!(
        writer,
        "Added entry {} for '{}' ({})",
        entry.id,
        entry.project_name,
        format_duration(duration)
    )?;
    Ok(entry)
}

#[cfg(test)]
mod tests {
    use super::*;

    use tmpo_db::DbError;

    #[test]
    fn manual_adds_finished_entry() {
        let db = Database::open_in_memory().unwrap();
        let mut output = Vec::new();
        let entry = run(
            &mut output,
            &db,
            "tmpo",
            "2025-01-01T09:00:00Z",
            "2025-01-01T09:45:00Z",
            Some("standup"),
        )
        .unwrap();

        assert!(!entry.is_running());
        assert_eq!(entry.description.as_deref(), Some("standup"));
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "Added entry 1 for 'tmpo' (45m 0s)\n"
        );
    }

    #[test]
    fn manual_rejects_inverted_range() {
        let db = Database::open_in_memory().unwrap();
        let err = run(
            &mut Vec::new(),
            &db,
            "tmpo",
            "2025-01-01T10:00:00Z",
            "2025-01-01T09:00:00Z",
            None,
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DbError>(),
            Some(DbError::InvalidRange { .. })
        ));
    }

    #[test]
    fn manual_rejects_bad_time() {
        let db = Database::open_in_memory().unwrap();
        assert!(run(&mut Vec::new(), &db, "tmpo", "soon", "later", None).is_err());
    }
}
