//! Stop command: end the running entry.

use std::io::Write;

use anyhow::Result;
use chrono::Utc;

use tmpo_core::{TimeEntry, format_duration};
use tmpo_db::Database;

/// Stops whatever is running and returns the stopped entry.
///
/// Fails when nothing is being tracked.
pub fn stop_running(db: &mut Database) -> Result<TimeEntry> {
    let Some(running) = db.get_running_entry()? else {
        anyhow::bail!("No active time tracking. Use 'tmpo start' to begin.");
    };
    Ok(db.stop_entry(running.id)?)
}

/// Runs the stop command.
pub fn run<W: Write>(writer: &mut W, db: &mut Database) -> Result<TimeEntry> {
    let entry = stop_running(db)?;
    writeln!(
        writer,
        "Stopped tracking '{}' after {}",
        entry.project_name,
        format_duration(entry.duration_at(Utc::now()))
    )?;
    Ok(entry)
}

#[cfg(test)]
mod tests {
    use super::*;

    use tmpo_core::ProjectName;

    #[test]
    fn stop_ends_running_entry() {
        let mut db = Database::open_in_memory().unwrap();
        let started = db
            .start_entry(&ProjectName::new("tmpo").unwrap(), None)
            .unwrap();
        let mut output = Vec::new();

        let stopped = run(&mut output, &mut db).unwrap();

        assert_eq!(stopped.id, started.id);
        assert!(stopped.end_time.is_some());
        assert!(db.get_running_entry().unwrap().is_none());
        assert!(
            String::from_utf8(output)
                .unwrap()
                .starts_with("Stopped tracking 'tmpo' after ")
        );
    }

    #[test]
    fn stop_without_running_entry_fails() {
        let mut db = Database::open_in_memory().unwrap();
        let err = run(&mut Vec::new(), &mut db).unwrap_err();
        assert!(err.to_string().contains("No active time tracking"));
    }
}
