//! Time entries and the query/update shapes used against the store.

use chrono::{DateTime, Duration, Utc};

use crate::ProjectName;

/// A single tracked interval.
///
/// An entry is *running* while `end_time` is `None`. At most one entry may be
/// running at any time; the store enforces this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeEntry {
    pub id: i64,
    pub project_name: ProjectName,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub description: Option<String>,
}

impl TimeEntry {
    /// Returns true if the entry has not been stopped.
    pub const fn is_running(&self) -> bool {
        self.end_time.is_none()
    }

    /// Elapsed time of the entry as observed at `now`.
    ///
    /// Stopped entries use their stored end time; running entries are measured
    /// up to `now`. Never negative.
    pub fn duration_at(&self, now: DateTime<Utc>) -> Duration {
        let end = self.end_time.unwrap_or(now);
        (end - self.start_time).max(Duration::zero())
    }
}

/// Partial update for an existing entry.
///
/// `None` leaves a field untouched. For `description`, `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryUpdate {
    pub project_name: Option<ProjectName>,
    #[allow(clippy::option_option)]
    pub description: Option<Option<String>>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl EntryUpdate {
    /// Returns true if the update would not change anything.
    pub const fn is_empty(&self) -> bool {
        self.project_name.is_none()
            && self.description.is_none()
            && self.start_time.is_none()
            && self.end_time.is_none()
    }
}

/// Selection criteria for listing entries.
///
/// `since` is inclusive and `until` exclusive, both compared to `start_time`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryFilter {
    pub project: Option<ProjectName>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}
