use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const FIRST_RUN_PAGES: u32 = 2;
pub const STEADY_STATE_PAGES: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountDirState {
    Missing,
    Present,
}

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("failed to stat {path}: {source}")]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{0} is not a directory")]
    NotADirectory(PathBuf),
}

pub fn inspect_account_dir(dir: &Path) -> Result<AccountDirState, PlanError> {
    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(AccountDirState::Present),
        Ok(_) => Err(PlanError::NotADirectory(dir.to_path_buf())),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(AccountDirState::Missing),
        Err(source) => Err(PlanError::Stat {
            path: dir.to_path_buf(),
            source,
        }),
    }
}

/// Pull one extra page of backlog the first time an account is seen.
pub fn page_count(state: AccountDirState) -> u32 {
    match state {
        AccountDirState::Missing => FIRST_RUN_PAGES,
        AccountDirState::Present => STEADY_STATE_PAGES,
    }
}
