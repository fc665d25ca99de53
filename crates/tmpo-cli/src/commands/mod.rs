//! CLI subcommand implementations.

// Tracking
pub mod pause;
pub mod resume;
pub mod start;
pub mod status;
pub mod stop;

// History
pub mod export;
pub mod log;
pub mod stats;

// Entries
pub mod delete;
pub mod edit;
pub mod manual;

// Setup
pub mod init;

pub mod util;
