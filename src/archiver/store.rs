use crate::archiver::codec::{decode_month, encode_month, sort_records};
use crate::archiver::lock::LOCK_FILE;
use crate::weibo::Mblog;
use anyhow::{Context, Result};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

const MONTH_FILE_EXT: &str = "txt";

/// Load/save seam for month files.
pub trait MonthStore {
    /// Records in `path`; a missing file is an empty month.
    fn load(&self, path: &Path) -> Result<Vec<Mblog>>;

    /// Sort `mblogs` and overwrite `path` with them.
    fn save(&self, path: &Path, mblogs: Vec<Mblog>) -> Result<()>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FsMonthStore;

impl MonthStore for FsMonthStore {
    fn load(&self, path: &Path) -> Result<Vec<Mblog>> {
        match fs::read_to_string(path) {
            Ok(raw) => Ok(decode_month(&raw)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(err).with_context(|| format!("failed to read {}", path.display())),
        }
    }

    fn save(&self, path: &Path, mblogs: Vec<Mblog>) -> Result<()> {
        let body = encode_month(&sort_records(mblogs));

        let mut opts = fs::OpenOptions::new();
        opts.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            opts.mode(0o644);
        }
        let mut file = opts
            .open(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        file.write_all(body.as_bytes())
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }
}

pub fn month_file_path(account_dir: &Path, month: &str) -> PathBuf {
    account_dir.join(format!("{month}.{MONTH_FILE_EXT}"))
}

/// Directory for `userid` under `destination`. Identifiers that would
/// escape the destination or land on the lock file are rejected.
pub fn account_dir(destination: &Path, userid: &str) -> Result<PathBuf> {
    if userid.trim().is_empty() {
        anyhow::bail!("invalid userid {userid:?}: empty");
    }
    if userid == "." || userid == ".." || userid.contains(['/', '\\']) {
        anyhow::bail!("invalid userid {userid:?}: not a plain directory name");
    }
    if userid == LOCK_FILE {
        anyhow::bail!("invalid userid {userid:?}: reserved for the destination lock");
    }
    Ok(destination.join(userid))
}

/// `mkdir -p` with mode 0755; an existing directory is success.
pub fn create_dir_all(path: &Path) -> Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }
    builder
        .create(path)
        .with_context(|| format!("failed to create {}", path.display()))
}
