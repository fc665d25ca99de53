//! Edit command: change fields of an existing entry.

use std::io::Write;

use anyhow::{Context, Result};

use tmpo_core::{EntryUpdate, ProjectName, TimeEntry};
use tmpo_db::Database;

use super::util::parse_datetime;
use crate::cli::EditArgs;

/// Builds the store update from command-line arguments.
fn build_update(args: &EditArgs) -> Result<EntryUpdate> {
    let description = if args.clear_description {
        Some(None)
    } else {
        args.description.clone().map(Some)
    };
    Ok(EntryUpdate {
        project_name: args.project.as_deref().map(ProjectName::new).transpose()?,
        description,
        start_time: args
            .start
            .as_deref()
            .map(parse_datetime)
            .transpose()
            .context("invalid --start")?,
        end_time: args
            .end
            .as_deref()
            .map(parse_datetime)
            .transpose()
            .context("invalid --end")?,
    })
}

pub fn run<W: Write>(writer: &mut W, db: &mut Database, args: &EditArgs) -> Result<TimeEntry> {
    let update = build_update(args)?;
    if update.is_empty() {
        anyhow::bail!(
            "Nothing to change. Pass --project, --description, --clear-description, --start or --end."
        );
    }
    let entry = db.update_entry(args.id, &update)?;
    writeln!(writer, "Updated entry {} ({})", entry.id, entry.project_name)?;
    Ok(entry)
}
