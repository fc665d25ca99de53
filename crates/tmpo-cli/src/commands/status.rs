//! Status command for showing the running entry.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Local, TimeZone, Utc};

use tmpo_core::{TimeEntry, format_duration};
use tmpo_db::Database;

use super::util::format_time;

pub fn run<W: Write>(writer: &mut W, db: &Database) -> Result<()> {
    let running = db.get_running_entry()?;
    write!(writer, "{}", render(running.as_ref(), Utc::now(), &Local))?;
    Ok(())
}

/// Renders the status text for the running entry, if any.
pub fn render<Tz: TimeZone>(running: Option<&TimeEntry>, now: DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let Some(entry) = running else {
        return "No active time tracking.\n".to_string();
    };

    let mut out = String::new();
    writeln!(out, "Currently tracking: {}", entry.project_name).unwrap();
    if let Some(description) = &entry.description {
        writeln!(out, "Description: {description}").unwrap();
    }
    writeln!(out, "Started: {}", format_time(entry.start_time, tz)).unwrap();
    writeln!(out, "Elapsed: {}", format_duration(entry.duration_at(now))).unwrap();
    out
}
