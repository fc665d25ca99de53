//! Advisory lock serializing mutating commands across processes.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;

/// Exclusive lock on `<data dir>/.lock`, held until dropped.
#[derive(Debug)]
pub struct DataDirLock {
    file: File,
    path: PathBuf,
}

impl DataDirLock {
    /// Blocks until the lock for `data_dir` is acquired.
    pub fn acquire(data_dir: &Path) -> Result<Self> {
        fs::create_dir_all(data_dir).context("failed to create data directory")?;

        let path = data_dir.join(".lock");
        let file = File::create(&path).context("failed to create lock file")?;
        FileExt::lock_exclusive(&file).context("failed to acquire lock")?;
        tracing::debug!(path = %path.display(), "acquired data directory lock");

        Ok(Self { file, path })
    }
}

impl Drop for DataDirLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to release lock");
        }
    }
}
