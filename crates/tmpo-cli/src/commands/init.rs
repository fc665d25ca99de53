//! Init command for creating a `.tmporc` project file.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use tmpo_core::project::PROJECT_FILE;
use tmpo_core::{ProjectFile, ProjectName, detect_project_name};

/// Runs the init command in `dir`.
///
/// Returns the path of the written file.
pub fn run<W: Write>(writer: &mut W, dir: &Path, name: Option<&str>, force: bool) -> Result<PathBuf> {
    let path = dir.join(PROJECT_FILE);
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite it.",
            path.display()
        );
    }

    let project_name = match name {
        Some(name) => ProjectName::new(name)?,
        None => detect_project_name(dir).context("failed to detect project name")?,
    };
    ProjectFile { project_name }.save(&path)?;

    let saved = ProjectFile::load(&path)?.context("project file vanished after writing")?;
    writeln!(writer, "Project: {}", saved.project_name)?;
    writeln!(writer, "Saved to: {}", path.display())?;

    Ok(path)
}
