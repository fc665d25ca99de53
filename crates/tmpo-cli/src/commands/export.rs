//! Implementation of the `tmpo export` command.
//!
//! Writes entries as CSV or a JSON array, oldest first, to stdout or a file.

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Local, SecondsFormat, Utc};
use serde::Serialize;

use tmpo_core::{EntryFilter, ProjectName, TimeEntry};
use tmpo_db::Database;

use super::util::Period;
use crate::cli::ExportFormat;

const CSV_HEADER: &str = "id,project,start_time,end_time,duration_seconds,description";

/// One exported entry.
#[derive(Debug, Serialize)]
struct ExportRecord<'a> {
    id: i64,
    project: &'a str,
    start_time: String,
    end_time: Option<String>,
    duration_seconds: i64,
    description: Option<&'a str>,
}

impl<'a> ExportRecord<'a> {
    fn new(entry: &'a TimeEntry, now: DateTime<Utc>) -> Self {
        Self {
            id: entry.id,
            project: entry.project_name.as_str(),
            start_time: format_rfc3339(entry.start_time),
            end_time: entry.end_time.map(format_rfc3339),
            duration_seconds: entry.duration_at(now).num_seconds(),
            description: entry.description.as_deref(),
        }
    }
}

fn format_rfc3339(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Run the export command.
///
/// Returns the number of exported entries.
pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    format: ExportFormat,
    output: Option<&Path>,
    project: Option<&str>,
    period: Period,
) -> Result<usize> {
    let filter = EntryFilter {
        project: project.map(ProjectName::new).transpose()?,
        ..period.filter(Local::now().date_naive())
    };
    let mut entries = db.list_entries(&filter)?;
    entries.reverse();
    let now = Utc::now();

    if let Some(path) = output {
        let file = File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        let mut file = BufWriter::new(file);
        write_entries(&mut file, &entries, format, now)?;
        file.flush()
            .with_context(|| format!("failed to write {}", path.display()))?;
        writeln!(
            writer,
            "Exported {} entries to {}",
            entries.len(),
            path.display()
        )?;
    } else {
        write_entries(writer, &entries, format, now)?;
    }

    tracing::debug!(count = entries.len(), ?format, "exported entries");
    Ok(entries.len())
}

fn write_entries<W: Write>(
    writer: &mut W,
    entries: &[TimeEntry],
    format: ExportFormat,
    now: DateTime<Utc>,
) -> Result<()> {
    let records: Vec<ExportRecord<'_>> = entries.iter().map(|e| ExportRecord::new(e, now)).collect();
    match format {
        ExportFormat::Csv => write_csv(writer, &records),
        ExportFormat::Json => {
            serde_json::to_writer_pretty(&mut *writer, &records)
                .context("failed to serialize entries")?;
            writeln!(writer)?;
            Ok(())
        }
    }
}

fn write_csv<W: Write>(writer: &mut W, records: &[ExportRecord<'_>]) -> Result<()> {
    writeln!(writer, "{CSV_HEADER}")?;
    for r in records {
        writeln!(
            writer,
            "{},{},{},{},{},{}",
            r.id,
            csv_field(r.project),
            r.start_time,
            r.end_time.as_deref().unwrap_or(""),
            r.duration_seconds,
            csv_field(r.description.unwrap_or("")),
        )?;
    }
    Ok(())
}

/// Quotes a CSV field when it contains a delimiter, quote or line break.
fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}
