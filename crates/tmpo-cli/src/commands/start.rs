//! Start command: begin tracking a project.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use tmpo_core::{ProjectName, TimeEntry, detect_project_name};
use tmpo_db::Database;

/// Runs the start command.
///
/// Without an explicit project, the name is detected from `cwd`.
pub fn run<W: Write>(
    writer: &mut W,
    db: &mut Database,
    project: Option<&str>,
    description: Option<&str>,
    cwd: &Path,
) -> Result<TimeEntry> {
    let project = match project {
        Some(name) => ProjectName::new(name)?,
        None => detect_project_name(cwd).context("failed to detect project name")?,
    };

    let entry = db.start_entry(&project, description)?;

    writeln!(
        writer,
        "Started tracking time for '{}'",
        entry.project_name
    )?;
    if let Some(description) = &entry.description {
        writeln!(writer, "Description: {description}")?;
    }
    Ok(entry)
}

#[cfg(test)]
mod tests {
    use super::*;

    use tmpo_db::DbError;

    #[test]
    fn start_uses_explicit_project() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = Database::open_in_memory().unwrap();
        let mut output = Vec::new();

        let entry = run(&mut output, &mut db, Some("tmpo"), Some("write docs"), dir.path()).unwrap();

        assert_eq!(entry.project_name.as_str(), "tmpo");
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "Started tracking time for 'tmpo'\nDescription: write docs\n"
        );
    }

    #[test]
    fn start_detects_project_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        let project_dir = dir.path().join("website");
        std::fs::create_dir(&project_dir).unwrap();
        let mut db = Database::open_in_memory().unwrap();

        let entry = run(&mut Vec::new(), &mut db, None, None, &project_dir).unwrap();
        assert_eq!(entry.project_name.as_str(), "website");
    }

    #[test]
    fn start_while_running_is_a_conflict() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = Database::open_in_memory().unwrap();
        run(&mut Vec::new(), &mut db, Some("alpha"), None, dir.path()).unwrap();

        let err = run(&mut Vec::new(), &mut db, Some("beta"), None, dir.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DbError>(),
            Some(DbError::AlreadyRunning { .. })
        ));
    }

    #[test]
    fn start_rejects_blank_project() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = Database::open_in_memory().unwrap();
        assert!(run(&mut Vec::new(), &mut db, Some("  "), None, dir.path()).is_err());
        assert!(db.get_running_entry().unwrap().is_none());
    }
}
