//! Resume command: start a new entry for the most recently stopped project.

use std::io::Write;

use anyhow::Result;

use tmpo_core::TimeEntry;
use tmpo_db::Database;

/// Runs the resume command.
pub fn run<W: Write>(writer: &mut W, db: &mut Database) -> Result<TimeEntry> {
    if let Some(running) = db.get_running_entry()? {
        anyhow::bail!(
            "Already tracking time for '{}'. Use 'tmpo pause' or 'tmpo stop' first.",
            running.project_name
        );
    }
    let Some(last) = db.last_stopped_entry()? else {
        anyhow::bail!("Nothing to resume. Use 'tmpo start' to begin.");
    };

    let entry = db.start_entry(&last.project_name, last.description.as_deref())?;
    writeln!(writer, "Resumed tracking time for '{}'", entry.project_name)?;
    if let Some(description) = &entry.description {
        writeln!(writer, "Description: {description}")?;
    }
    Ok(entry)
}

#[cfg(test)]
mod tests {
    use super::*;

    use tmpo_core::ProjectName;

    #[test]
    fn pause_then_resume_creates_new_entry() {
        let mut db = Database::open_in_memory().unwrap();
        let first = db
            .start_entry(&ProjectName::new("tmpo").unwrap(), Some("refactor"))
            .unwrap();
        crate::commands::pause::run(&mut Vec::new(), &mut db).unwrap();

        let mut output = Vec::new();
        let resumed = run(&mut output, &mut db).unwrap();

        assert_ne!(resumed.id, first.id);
        assert_eq!(resumed.project_name, first.project_name);
        assert_eq!(resumed.description.as_deref(), Some("refactor"));
        assert!(resumed.is_running());
        assert_eq!(db.count_entries().unwrap(), 2);
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "Resumed tracking time for 'tmpo'\nDescription: refactor\n"
        );
    }

    #[test]
    fn resume_while_running_fails() {
        let mut db = Database::open_in_memory().unwrap();
        db.start_entry(&ProjectName::new("tmpo").unwrap(), None)
            .unwrap();
        let err = run(&mut Vec::new(), &mut db).unwrap_err();
        assert!(err.to_string().contains("Already tracking"));
    }

    #[test]
    fn resume_with_empty_history_fails() {
        let mut db = Database::open_in_memory().unwrap();
        let err = run(&mut Vec::new(), &mut db).unwrap_err();
        assert!(err.to_string().contains("Nothing to resume"));
    }
}
