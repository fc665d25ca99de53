//! Pause command.
//!
//! There is no separate paused state: pausing stops the running entry, and
//! `tmpo resume` later starts a fresh entry for the same project.

use std::io::Write;

use anyhow::Result;
use chrono::Utc;

use tmpo_core::{TimeEntry, format_duration};
use tmpo_db::Database;

use super::stop::stop_running;

/// Runs the pause command.
pub fn run<W: Write>(writer: &mut W, db: &mut Database) -> Result<TimeEntry> {
    let entry = stop_running(db)?;
    writeln!(
        writer,
        "Paused tracking '{}' after {}",
        entry.project_name,
        format_duration(entry.duration_at(Utc::now()))
    )?;
    writeln!(writer, "Use 'tmpo resume' to continue.")?;
    Ok(entry)
}

#[cfg(test)]
mod tests {
    use super::*;

    use tmpo_core::ProjectName;

    #[test]
    fn pause_stops_running_entry() {
        let mut db = Database::open_in_memory().unwrap();
        db.start_entry(&ProjectName::new("tmpo").unwrap(), None)
            .unwrap();

        let paused = run(&mut Vec::new(), &mut db).unwrap();
        assert!(!paused.is_running());
        assert!(db.get_running_entry().unwrap().is_none());
    }

    #[test]
    fn pause_without_running_entry_fails() {
        let mut db = Database::open_in_memory().unwrap();
        assert!(run(&mut Vec::new(), &mut db).is_err());
    }
}
