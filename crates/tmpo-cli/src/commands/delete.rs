//! Delete command.

use std::io::Write;

use anyhow::Result;

use tmpo_core::TimeEntry;
use tmpo_db::Database;

pub fn run<W: Write>(writer: &mut W, db: &mut Database, id: i64) -> Result<TimeEntry> {
    let entry = db.delete_entry(id)?;
    writeln!(writer, "Deleted entry {} ({})", entry.id, entry.project_name)?;
    Ok(entry)
}
