//! Project name detection and the per-directory `.tmporc` file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{ProjectName, ValidationError};

/// File name of the per-directory project file.
pub const PROJECT_FILE: &str = ".tmporc";

/// Errors reading or writing a project file.
#[derive(Debug, Error)]
pub enum ProjectFileError {
    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("could not determine a project name for {0}")]
    Undetectable(PathBuf),
}

/// Contents of a `.tmporc` file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFile {
    pub project_name: ProjectName,
}

impl ProjectFile {
    /// Loads a project file.
    ///
    /// Returns `None` if the file doesn't exist.
    pub fn load(path: &Path) -> Result<Option<Self>, ProjectFileError> {
        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content)
                .map(Some)
                .map_err(|source| ProjectFileError::Parse {
                    path: path.to_path_buf(),
                    source,
                }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(ProjectFileError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Writes the project file as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), ProjectFileError> {
        let mut json = serde_json::to_string_pretty(self).map_err(|source| {
            ProjectFileError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })?;
        json.push('\n');
        std::fs::write(path, json).map_err(|source| ProjectFileError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Finds the nearest `.tmporc` in `dir` or its ancestors.
pub fn find_project_file(dir: &Path) -> Option<PathBuf> {
    dir.ancestors()
        .map(|d| d.join(PROJECT_FILE))
        .find(|p| p.is_file())
}

/// Finds the nearest git repository root at or above `dir`.
pub fn find_git_root(dir: &Path) -> Option<PathBuf> {
    dir.ancestors()
        .find(|d| d.join(".git").exists())
        .map(Path::to_path_buf)
}

/// Extract repo name from a git remote URL.
pub fn parse_remote_name(url: &str) -> Option<String> {
    let url = url.trim().trim_end_matches('/');
    let name = url
        .rsplit(['/', ':'])
        .next()?
        .trim_end_matches(".git");

    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Reads the `origin` remote URL from a repository's `.git/config`.
///
/// Only plain `.git` directories are read; worktree `.git` files yield `None`.
fn origin_remote_url(git_root: &Path) -> Option<String> {
    let config = std::fs::read_to_string(git_root.join(".git").join("config")).ok()?;
    let mut in_origin = false;
    for line in config.lines() {
        let line = line.trim();
        if line.starts_with('[') {
            in_origin = line == r#"[remote "origin"]"#;
            continue;
        }
        if in_origin {
            if let Some((key, value)) = line.split_once('=') {
                if key.trim() == "url" {
                    return Some(value.trim().to_string());
                }
            }
        }
    }
    None
}

fn dir_name(dir: &Path) -> Option<String> {
    dir.file_name()
        .and_then(|n| n.to_str())
        .map(String::from)
}

/// Detects the project name for work happening in `dir`.
///
/// Precedence: nearest `.tmporc`, then the git `origin` remote name, then the
/// git root directory name, then the name of `dir` itself.
pub fn detect_project_name(dir: &Path) -> Result<ProjectName, ProjectFileError> {
    if let Some(path) = find_project_file(dir) {
        if let Some(file) = ProjectFile::load(&path)? {
            tracing::debug!(path = %path.display(), "project from project file");
            return Ok(file.project_name);
        }
    }

    if let Some(root) = find_git_root(dir) {
        let name = origin_remote_url(&root)
            .as_deref()
            .and_then(parse_remote_name)
            .or_else(|| dir_name(&root));
        if let Some(name) = name {
            tracing::debug!(root = %root.display(), "project from git repository");
            return Ok(ProjectName::new(name)?);
        }
    }

    let name = dir_name(dir).ok_or_else(|| ProjectFileError::Undetectable(dir.to_path_buf()))?;
    Ok(ProjectName::new(name)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_git_remote_url() {
        assert_eq!(
            parse_remote_name("https://github.com/user/time-tracker.git"),
            Some("time-tracker".to_string())
        );
        assert_eq!(
            parse_remote_name("git@github.com:user/dotfiles.git"),
            Some("dotfiles".to_string())
        );
        assert_eq!(
            parse_remote_name("git@host:bare.git"),
            Some("bare".to_string())
        );
        assert_eq!(parse_remote_name(""), None);
    }

    #[test]
    fn project_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(PROJECT_FILE);
        assert!(ProjectFile::load(&path).unwrap().is_none());

        let file = ProjectFile {
            project_name: ProjectName::new("client-a").unwrap(),
        };
        file.save(&path).unwrap();
        assert_eq!(ProjectFile::load(&path).unwrap(), Some(file));
    }

    #[test]
    fn malformed_project_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(PROJECT_FILE);
        std::fs::write(&path, "project_name: nope").unwrap();
        assert!(matches!(
            ProjectFile::load(&path),
            Err(ProjectFileError::Parse { .. })
        ));
    }

    #[test]
    fn detect_prefers_project_file_in_ancestor() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("repo").join("src");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::create_dir(dir.path().join("repo").join(".git")).unwrap();
        ProjectFile {
            project_name: ProjectName::new("from-file").unwrap(),
        }
        .save(&dir.path().join(PROJECT_FILE))
        .unwrap();

        let name = detect_project_name(&nested).unwrap();
        assert_eq!(name.as_str(), "from-file");
    }

    #[test]
    fn detect_uses_git_remote_then_root_name() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("checkout");
        let nested = root.join("crates").join("core");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::create_dir(root.join(".git")).unwrap();

        assert_eq!(detect_project_name(&nested).unwrap().as_str(), "checkout");

        std::fs::write(
            root.join(".git").join("config"),
            "[core]\n\tbare = false\n[remote \"origin\"]\n\turl = git@github.com:me/tmpo.git\n\tfetch = +refs/heads/*:refs/remotes/origin/*\n",
        )
        .unwrap();
        assert_eq!(detect_project_name(&nested).unwrap().as_str(), "tmpo");
    }

    #[test]
    fn detect_falls_back_to_directory_name() {
        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("notes");
        std::fs::create_dir(&plain).unwrap();
        assert_eq!(detect_project_name(&plain).unwrap().as_str(), "notes");
    }
}
