use crate::error::ArchiverError;
use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

pub const LOCK_FILE: &str = ".weibo-archiver.lock";

/// Exclusive advisory lock on a destination directory, held until drop.
#[derive(Debug)]
pub struct DestinationLock {
    file: File,
    path: PathBuf,
}

impl DestinationLock {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DestinationLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

pub fn acquire(destination: &Path) -> Result<DestinationLock> {
    let path = destination.join(LOCK_FILE);
    let file = fs::OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .truncate(false)
        .open(&path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    if FileExt::try_lock_exclusive(&file).is_err() {
        return Err(ArchiverError::DestinationLocked(path.display().to_string()).into());
    }

    Ok(DestinationLock { file, path })
}
