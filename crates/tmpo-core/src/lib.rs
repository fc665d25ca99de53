//! Core domain types for the tmpo time tracker.
//!
//! This crate contains:
//! - Entries: the tracked intervals and the query/update shapes for the store
//! - Statistics: per-project totals and duration formatting
//! - Project detection: resolving a project name from a working directory

mod entry;
pub mod project;
mod stats;
mod types;

pub use entry::{EntryFilter, EntryUpdate, TimeEntry};
pub use project::{ProjectFile, ProjectFileError, detect_project_name};
pub use stats::{ProjectStats, format_duration, grand_total, summarize};
pub use types::{ProjectName, ValidationError, normalize_description};
