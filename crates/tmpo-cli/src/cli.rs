//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::commands::util::Period;

/// tmpo - Set the tmpo.
///
/// A minimal, developer-friendly time tracking tool that lives in your
/// terminal. Track time with automatic project detection and simple commands.
#[derive(Debug, Parser)]
#[command(name = "tmpo", version, about, long_about = None, disable_version_flag = true)]
pub struct Cli {
    /// Print version.
    #[arg(short = 'v', long, action = clap::ArgAction::Version)]
    pub version: Option<bool>,

    /// Enable verbose output.
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    // Tracking
    /// Start tracking time for a project.
    Start {
        /// Project name. Detected from `.tmporc` or the git repository when omitted.
        project: Option<String>,

        /// What you are working on.
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Stop the running timer.
    Stop,

    /// Pause the running timer.
    Pause,

    /// Resume the most recently stopped project.
    Resume,

    /// Show current tracking status.
    Status,

    // History
    /// List recorded time entries.
    Log {
        /// Maximum number of entries to show.
        #[arg(short = 'n', long, default_value_t = 10)]
        limit: usize,

        /// Only show entries for this project.
        #[arg(short, long)]
        project: Option<String>,

        #[command(flatten)]
        period: PeriodArgs,
    },

    /// Show time totals per project.
    Stats {
        #[command(flatten)]
        period: PeriodArgs,
    },

    /// Export time entries.
    Export {
        /// Output format.
        #[arg(short, long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,

        /// Write to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only export entries for this project.
        #[arg(short, long)]
        project: Option<String>,

        #[command(flatten)]
        period: PeriodArgs,
    },

    // Entries
    /// Edit an existing entry.
    Edit(EditArgs),

    /// Delete an entry.
    Delete {
        /// Entry ID.
        id: i64,
    },

    /// Record a finished entry after the fact.
    Manual {
        /// Project name.
        project: String,

        /// Start time (RFC 3339, 'YYYY-MM-DD HH:MM' local, or '2 hours ago').
        #[arg(long)]
        start: String,

        /// End time (same formats as --start).
        #[arg(long)]
        end: String,

        /// What you worked on.
        #[arg(short, long)]
        description: Option<String>,
    },

    // Setup
    /// Create a `.tmporc` project file in the current directory.
    Init {
        /// Project name. Defaults to the detected project.
        #[arg(long)]
        name: Option<String>,

        /// Overwrite an existing `.tmporc`.
        #[arg(long)]
        force: bool,
    },
}

impl Commands {
    /// Returns true for commands that write to the entry store.
    pub const fn is_mutating(&self) -> bool {
        matches!(
            self,
            Self::Start { .. }
                | Self::Stop
                | Self::Pause
                | Self::Resume
                | Self::Edit(_)
                | Self::Delete { .. }
                | Self::Manual { .. }
        )
    }
}

/// Reporting window flags shared by history commands.
#[derive(Debug, Clone, Copy, Default, Args)]
pub struct PeriodArgs {
    /// Only include entries started today.
    #[arg(long, conflicts_with = "week")]
    pub today: bool,

    /// Only include entries started this week.
    #[arg(long)]
    pub week: bool,
}

impl PeriodArgs {
    pub const fn period(self) -> Period {
        if self.today {
            Period::Today
        } else if self.week {
            Period::Week
        } else {
            Period::All
        }
    }
}

/// Arguments for `tmpo edit`.
#[derive(Debug, Args)]
pub struct EditArgs {
    /// Entry ID.
    pub id: i64,

    /// New project name.
    #[arg(short, long)]
    pub project: Option<String>,

    /// New description.
    #[arg(short, long, conflicts_with = "clear_description")]
    pub description: Option<String>,

    /// Remove the description.
    #[arg(long)]
    pub clear_description: bool,

    /// New start time.
    #[arg(long)]
    pub start: Option<String>,

    /// New end time. Only stopped entries can be given an end time.
    #[arg(long)]
    pub end: Option<String>,
}

/// Export file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn short_v_prints_version() {
        let err = Cli::try_parse_from(["tmpo", "-v"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayVersion);
    }

    #[test]
    fn verbose_is_long_only_and_global() {
        let cli = Cli::try_parse_from(["tmpo", "status", "--verbose"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Some(Commands::Status)));

        let err = Cli::try_parse_from(["tmpo", "status", "-v"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }
}
