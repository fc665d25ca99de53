//! tmpo CLI library.
//!
//! This crate provides the command-line interface over the entry store.

mod cli;
pub mod commands;
mod config;
mod lock;

pub use cli::{Cli, Commands, EditArgs, ExportFormat, PeriodArgs};
pub use config::Config;
pub use lock::DataDirLock;
