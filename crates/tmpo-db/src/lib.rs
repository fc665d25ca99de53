//! Storage layer for tmpo.
//!
//! Provides persistence for time entries using `rusqlite`, and enforces the
//! entry lifecycle: at most one entry is running (has no end time) at a time.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` is meant to be opened once per command invocation and passed
//! by reference to whatever needs it.
//!
//! # Schema
//!
//! ## Timestamp Format
//!
//! Timestamps are stored as TEXT in RFC 3339 UTC format with millisecond
//! precision (e.g., `2024-01-15T10:30:00.000Z`). This ensures:
//! - Lexicographic ordering matches chronological ordering
//! - Human-readable values in the database
//! - Timezone-aware (always UTC)
//!
//! ## Single running entry
//!
//! A partial unique index over `end_time IS NULL` lets SQLite itself reject a
//! second running row. [`Database::start_entry`] additionally checks and
//! inserts inside one `IMMEDIATE` transaction so a conflict is reported as
//! [`DbError::AlreadyRunning`] rather than a constraint failure.
//!
//! A database that already holds several running rows (written by an older
//! tool) still opens: the index is skipped until those rows are stopped, and
//! [`Database::get_running_entry`] reports the latest one.

use std::path::{Path, PathBuf};
use std::time::Duration as StdDuration;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior, params};
use thiserror::Error;

use tmpo_core::{
    EntryFilter, EntryUpdate, ProjectName, TimeEntry, ValidationError, normalize_description,
};

/// How long a connection waits on a lock held by another process.
const BUSY_TIMEOUT: StdDuration = StdDuration::from_secs(5);

const ENTRY_COLUMNS: &str = "id, project_name, start_time, end_time, description";

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// The directory holding the database file could not be created.
    #[error("failed to create directory {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// No entry with the given id exists.
    #[error("time entry {0} not found")]
    NotFound(i64),
    /// The entry has already been stopped.
    #[error("time entry {0} is not running")]
    NotRunning(i64),
    /// Another entry is already running.
    #[error("already tracking time for '{project}' (entry {id})")]
    AlreadyRunning { id: i64, project: ProjectName },
    /// An end time was supplied for an entry that is still running.
    #[error("time entry {0} is still running; stop it instead of setting an end time")]
    EndTimeOnRunning(i64),
    /// The end time precedes the start time.
    #[error("end time {end} is before start time {start}")]
    InvalidRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    /// Failed to parse a stored timestamp.
    #[error("invalid timestamp for entry {entry_id}: {timestamp}")]
    TimestampParse {
        entry_id: i64,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A value failed domain validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for the lifecycle rules.
pub struct Database {
    conn: Connection,
}

/// Raw column values of a `time_entries` row.
struct EntryRow {
    id: i64,
    project_name: String,
    start_time: String,
    end_time: Option<String>,
    description: Option<String>,
}

impl EntryRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            project_name: row.get(1)?,
            start_time: row.get(2)?,
            end_time: row.get(3)?,
            description: row.get(4)?,
        })
    }

    fn into_entry(self) -> Result<TimeEntry, DbError> {
        let start_time = parse_timestamp(&self.start_time, self.id)?;
        let end_time = self
            .end_time
            .as_deref()
            .map(|t| parse_timestamp(t, self.id))
            .transpose()?;
        Ok(TimeEntry {
            id: self.id,
            project_name: ProjectName::new(self.project_name)?,
            start_time,
            end_time,
            description: self.description,
        })
    }
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// A missing parent directory is created with owner-only permissions.
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        ensure_parent_dir(path)?;
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        tracing::debug!(path = %path.display(), "opened entry store");
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.busy_timeout(BUSY_TIMEOUT)?;
        self.conn.execute_batch(
            "
            -- start_time/end_time: RFC 3339 UTC (e.g., '2024-01-15T10:30:00.000Z')
            -- end_time is NULL while the entry is running
            CREATE TABLE IF NOT EXISTS time_entries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                project_name TEXT NOT NULL,
                start_time TEXT NOT NULL,
                end_time TEXT,
                description TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_time_entries_start ON time_entries(start_time);
            CREATE INDEX IF NOT EXISTS idx_time_entries_project ON time_entries(project_name);
            ",
        )?;

        // Databases written by older tools may hold several running rows; the
        // unique index can't be built over them until they are stopped.
        let running: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM time_entries WHERE end_time IS NULL",
            [],
            |row| row.get(0),
        )?;
        if running > 1 {
            tracing::warn!(
                running,
                "multiple running entries found; stop them to restore the single-running index"
            );
            return Ok(());
        }
        self.conn.execute_batch(
            "
            CREATE UNIQUE INDEX IF NOT EXISTS idx_time_entries_single_running
                ON time_entries((end_time IS NULL)) WHERE end_time IS NULL;
            ",
        )?;
        Ok(())
    }

    /// Releases the underlying connection.
    pub fn close(self) -> Result<(), DbError> {
        self.conn.close().map_err(|(_, e)| DbError::Sqlite(e))
    }

    /// Inserts a new running entry starting now and returns it as stored.
    ///
    /// This does not look for a running entry first; use [`Self::start_entry`]
    /// for that. Once the single-running index exists, a second running row is
    /// refused by the schema and reported as [`DbError::AlreadyRunning`].
    pub fn create_entry(
        &self,
        project: &ProjectName,
        description: Option<&str>,
    ) -> Result<TimeEntry, DbError> {
        self.create_entry_at(project, description, Utc::now())
    }

    fn create_entry_at(
        &self,
        project: &ProjectName,
        description: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<TimeEntry, DbError> {
        let id = match insert_running(&self.conn, project, description, now) {
            Ok(id) => id,
            Err(DbError::Sqlite(e)) if is_unique_violation(&e) => {
                return Err(match query_running(&self.conn)? {
                    Some(running) => DbError::AlreadyRunning {
                        id: running.id,
                        project: running.project_name,
                    },
                    None => DbError::Sqlite(e),
                });
            }
            Err(e) => return Err(e),
        };
        tracing::info!(id, project = %project, "created time entry");
        self.get_entry(id)
    }

    /// Starts a new entry unless one is already running.
    ///
    /// The check and the insert happen in one transaction, so two concurrent
    /// invocations cannot both succeed.
    pub fn start_entry(
        &mut self,
        project: &ProjectName,
        description: Option<&str>,
    ) -> Result<TimeEntry, DbError> {
        self.start_entry_at(project, description, Utc::now())
    }

    fn start_entry_at(
        &mut self,
        project: &ProjectName,
        description: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<TimeEntry, DbError> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        if let Some(running) = query_running(&tx)? {
            return Err(DbError::AlreadyRunning {
                id: running.id,
                project: running.project_name,
            });
        }
        let id = insert_running(&tx, project, description, now)?;
        tx.commit()?;
        tracing::info!(id, project = %project, "started time entry");
        self.get_entry(id)
    }

    /// Returns the running entry, or `None` when nothing is being tracked.
    ///
    /// If several rows are running (only possible in a database written by an
    /// older tool), the latest start wins.
    pub fn get_running_entry(&self) -> Result<Option<TimeEntry>, DbError> {
        query_running(&self.conn)
    }

    /// Stops the entry with the given id, setting its end time to now.
    pub fn stop_entry(&mut self, id: i64) -> Result<TimeEntry, DbError> {
        self.stop_entry_at(id, Utc::now())
    }

    fn stop_entry_at(&mut self, id: i64, now: DateTime<Utc>) -> Result<TimeEntry, DbError> {
        let tx = self.conn.transaction()?;
        let entry = query_entry(&tx, id)?.ok_or(DbError::NotFound(id))?;
        if !entry.is_running() {
            return Err(DbError::NotRunning(id));
        }
        // A clock that stepped backwards must not produce end < start.
        let end = now.max(entry.start_time);
        tx.execute(
            "UPDATE time_entries SET end_time = ? WHERE id = ? AND end_time IS NULL",
            params![format_timestamp(end), id],
        )?;
        tx.commit()?;
        tracing::info!(id, project = %entry.project_name, "stopped time entry");
        self.get_entry(id)
    }

    /// Looks up a single entry by id.
    pub fn get_entry(&self, id: i64) -> Result<TimeEntry, DbError> {
        query_entry(&self.conn, id)?.ok_or(DbError::NotFound(id))
    }

    /// Inserts an entry that has already finished.
    ///
    /// Manual entries carry an end time, so they never conflict with the
    /// running entry.
    pub fn create_manual_entry(
        &self,
        project: &ProjectName,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        description: Option<&str>,
    ) -> Result<TimeEntry, DbError> {
        if end < start {
            return Err(DbError::InvalidRange { start, end });
        }
        self.conn.execute(
            "
            INSERT INTO time_entries (project_name, start_time, end_time, description)
            VALUES (?, ?, ?, ?)
            ",
            params![
                project.as_str(),
                format_timestamp(start),
                format_timestamp(end),
                normalize_description(description),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::info!(id, project = %project, "created manual time entry");
        self.get_entry(id)
    }

    /// Lists entries matching the filter, most recent start first.
    pub fn list_entries(&self, filter: &EntryFilter) -> Result<Vec<TimeEntry>, DbError> {
        let limit = filter
            .limit
            .map_or(-1, |l| i64::try_from(l).unwrap_or(i64::MAX));
        let mut stmt = self.conn.prepare(&format!(
            "
            SELECT {ENTRY_COLUMNS}
            FROM time_entries
            WHERE (?1 IS NULL OR project_name = ?1)
              AND (?2 IS NULL OR start_time >= ?2)
              AND (?3 IS NULL OR start_time < ?3)
            ORDER BY start_time DESC, id DESC
            LIMIT ?4
            "
        ))?;
        let rows = stmt.query_map(
            params![
                filter.project.as_ref().map(ProjectName::as_str),
                filter.since.map(format_timestamp),
                filter.until.map(format_timestamp),
                limit,
            ],
            EntryRow::from_row,
        )?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?.into_entry()?);
        }
        Ok(entries)
    }

    /// Applies a partial update to an entry and returns the result.
    ///
    /// The end time of a running entry can't be set here; running entries end
    /// through [`Self::stop_entry`].
    pub fn update_entry(&mut self, id: i64, update: &EntryUpdate) -> Result<TimeEntry, DbError> {
        let tx = self.conn.transaction()?;
        let current = query_entry(&tx, id)?.ok_or(DbError::NotFound(id))?;
        if update.is_empty() {
            return Ok(current);
        }
        if update.end_time.is_some() && current.is_running() {
            return Err(DbError::EndTimeOnRunning(id));
        }

        let start = update.start_time.unwrap_or(current.start_time);
        let end = update.end_time.or(current.end_time);
        if let Some(end) = end {
            if end < start {
                return Err(DbError::InvalidRange { start, end });
            }
        }
        let project = update
            .project_name
            .as_ref()
            .unwrap_or(&current.project_name);
        let description = match &update.description {
            Some(d) => normalize_description(d.as_deref()),
            None => current.description,
        };

        tx.execute(
            "
            UPDATE time_entries
            SET project_name = ?, start_time = ?, end_time = ?, description = ?
            WHERE id = ?
            ",
            params![
                project.as_str(),
                format_timestamp(start),
                end.map(format_timestamp),
                description,
                id,
            ],
        )?;
        tx.commit()?;
        tracing::info!(id, "updated time entry");
        self.get_entry(id)
    }

    /// Deletes an entry and returns what was removed.
    pub fn delete_entry(&mut self, id: i64) -> Result<TimeEntry, DbError> {
        let tx = self.conn.transaction()?;
        let entry = query_entry(&tx, id)?.ok_or(DbError::NotFound(id))?;
        tx.execute("DELETE FROM time_entries WHERE id = ?", [id])?;
        tx.commit()?;
        tracing::info!(id, project = %entry.project_name, "deleted time entry");
        Ok(entry)
    }

    /// Returns the entry that was stopped most recently.
    pub fn last_stopped_entry(&self) -> Result<Option<TimeEntry>, DbError> {
        self.conn
            .query_row(
                &format!(
                    "
                    SELECT {ENTRY_COLUMNS}
                    FROM time_entries
                    WHERE end_time IS NOT NULL
                    ORDER BY end_time DESC, id DESC
                    LIMIT 1
                    "
                ),
                [],
                EntryRow::from_row,
            )
            .optional()?
            .map(EntryRow::into_entry)
            .transpose()
    }

    /// Counts all stored entries.
    pub fn count_entries(&self) -> Result<u64, DbError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM time_entries", [], |row| row.get(0))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

fn insert_running(
    conn: &Connection,
    project: &ProjectName,
    description: Option<&str>,
    now: DateTime<Utc>,
) -> Result<i64, DbError> {
    conn.execute(
        "INSERT INTO time_entries (project_name, start_time, description) VALUES (?, ?, ?)",
        params![
            project.as_str(),
            format_timestamp(now),
            normalize_description(description),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn query_running(conn: &Connection) -> Result<Option<TimeEntry>, DbError> {
    conn.query_row(
        &format!(
            "
            SELECT {ENTRY_COLUMNS}
            FROM time_entries
            WHERE end_time IS NULL
            ORDER BY start_time DESC, id DESC
            LIMIT 1
            "
        ),
        [],
        EntryRow::from_row,
    )
    .optional()?
    .map(EntryRow::into_entry)
    .transpose()
}

fn query_entry(conn: &Connection, id: i64) -> Result<Option<TimeEntry>, DbError> {
    conn.query_row(
        &format!("SELECT {ENTRY_COLUMNS} FROM time_entries WHERE id = ?"),
        [id],
        EntryRow::from_row,
    )
    .optional()?
    .map(EntryRow::into_entry)
    .transpose()
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn ensure_parent_dir(path: &Path) -> Result<(), DbError> {
    let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };
    if parent.is_dir() {
        return Ok(());
    }
    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder
        .create(parent)
        .map_err(|source| DbError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    tracing::debug!(path = %parent.display(), "created data directory");
    Ok(())
}

fn parse_timestamp(timestamp: &str, entry_id: i64) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| DbError::TimestampParse {
            entry_id,
            timestamp: timestamp.to_string(),
            source,
        })
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
