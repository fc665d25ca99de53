use std::io::{Write, stdout};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tmpo_cli::commands::{
    delete, edit, export, init, log, manual, pause, resume, start, stats, status, stop,
};
use tmpo_cli::{Cli, Commands, Config, DataDirLock};

/// Load config and open the entry store, returning it with its file path.
fn open_database(config_path: Option<&Path>) -> Result<(tmpo_db::Database, PathBuf)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let database_path = config.database_path()?;
    let db = tmpo_db::Database::open(&database_path)
        .with_context(|| format!("failed to open database {}", database_path.display()))?;
    Ok((db, database_path))
}

/// Acquires the data directory lock next to the database file.
fn lock_data_dir(database_path: &Path) -> Result<DataDirLock> {
    let data_dir = database_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    DataDirLock::acquire(data_dir)
}

fn run_command(command: &Commands, db: &mut tmpo_db::Database, out: &mut impl Write) -> Result<()> {
    match command {
        Commands::Start {
            project,
            description,
        } => {
            let cwd = std::env::current_dir().context("failed to get current directory")?;
            start::run(out, db, project.as_deref(), description.as_deref(), &cwd)?;
        }
        Commands::Stop => {
            stop::run(out, db)?;
        }
        Commands::Pause => {
            pause::run(out, db)?;
        }
        Commands::Resume => {
            resume::run(out, db)?;
        }
        Commands::Status => status::run(out, db)?,
        Commands::Log {
            limit,
            project,
            period,
        } => log::run(out, db, *limit, project.as_deref(), period.period())?,
        Commands::Stats { period } => stats::run(out, db, period.period())?,
        Commands::Export {
            format,
            output,
            project,
            period,
        } => {
            export::run(
                out,
                db,
                *format,
                output.as_deref(),
                project.as_deref(),
                period.period(),
            )?;
        }
        Commands::Edit(args) => {
            edit::run(out, db, args)?;
        }
        Commands::Delete { id } => {
            delete::run(out, db, *id)?;
        }
        Commands::Manual {
            project,
            start,
            end,
            description,
        } => {
            manual::run(out, db, project, start, end, description.as_deref())?;
        }
        Commands::Init { name, force } => {
            let cwd = std::env::current_dir().context("failed to get current directory")?;
            init::run(out, &cwd, name.as_deref(), *force)?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let stdout = stdout();
    let mut out = stdout.lock();

    match &cli.command {
        Some(command) => {
            let (mut db, database_path) = open_database(cli.config.as_deref())?;
            let _lock = if command.is_mutating() {
                Some(lock_data_dir(&database_path)?)
            } else {
                None
            };
            run_command(command, &mut db, &mut out)?;
            db.close().context("failed to close database")?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
