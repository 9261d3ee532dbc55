use crate::archiver::clock::MonthClock;
use crate::archiver::codec;
use crate::archiver::dedup::Deduper;
use crate::archiver::planner::{self, PlanError};
use crate::archiver::store::{self, MonthStore};
use crate::archiver::warn::{self, WarnEvent};
use crate::weibo::{Fetcher, Mblog};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Per-account accounting tuple.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountStat {
    pub userid: String,
    pub fetched: usize,
    pub archived: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl AccountStat {
    pub fn summary_line(&self) -> String {
        format!(
            "User [{}] stats: fetched={} archived={} skipped={} failed={}",
            self.userid, self.fetched, self.archived, self.skipped, self.failed
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortStage {
    Userid,
    Stat,
    NotADirectory,
    Fetch,
    CreateDir,
}

impl AbortStage {
    pub fn label(self) -> &'static str {
        match self {
            Self::Userid => "userid",
            Self::Stat => "stat",
            Self::NotADirectory => "not-a-directory",
            Self::Fetch => "fetch",
            Self::CreateDir => "create-dir",
        }
    }
}

/// An account that stopped before anything was written for it.
#[derive(Debug, Clone)]
pub struct AccountAbort {
    pub userid: String,
    pub stage: AbortStage,
    pub reason: String,
}

impl fmt::Display for AccountAbort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "User [{}] aborted at {}: {}",
            self.userid,
            self.stage.label(),
            self.reason
        )
    }
}

#[derive(Debug, Clone)]
pub enum AccountOutcome {
    Archived(AccountStat),
    Aborted(AccountAbort),
}

#[derive(Debug, Clone, Default)]
pub struct RunOutcome {
    pub accounts: Vec<AccountOutcome>,
}

impl RunOutcome {
    pub fn stats(&self) -> impl Iterator<Item = &AccountStat> {
        self.accounts.iter().filter_map(|a| match a {
            AccountOutcome::Archived(stat) => Some(stat),
            AccountOutcome::Aborted(_) => None,
        })
    }

    pub fn aborts(&self) -> impl Iterator<Item = &AccountAbort> {
        self.accounts.iter().filter_map(|a| match a {
            AccountOutcome::Aborted(abort) => Some(abort),
            AccountOutcome::Archived(_) => None,
        })
    }
}

pub struct Archiver<'a, F: Fetcher, S: MonthStore> {
    fetcher: &'a F,
    store: &'a S,
    destination: PathBuf,
    clock: MonthClock,
}

impl<'a, F: Fetcher, S: MonthStore> Archiver<'a, F, S> {
    pub fn new(fetcher: &'a F, store: &'a S, destination: PathBuf, clock: MonthClock) -> Self {
        Self {
            fetcher,
            store,
            destination,
            clock,
        }
    }

    /// Archive every account in order. Failures stay inside their account.
    pub fn run(&self, userids: &[String]) -> RunOutcome {
        let accounts = userids
            .iter()
            .map(|userid| match self.archive_account(userid) {
                Ok(stat) => AccountOutcome::Archived(stat),
                Err(abort) => AccountOutcome::Aborted(abort),
            })
            .collect();
        RunOutcome { accounts }
    }

    pub fn archive_account(&self, userid: &str) -> Result<AccountStat, AccountAbort> {
        let abort = |stage: AbortStage, reason: String| AccountAbort {
            userid: userid.to_string(),
            stage,
            reason,
        };

        let dir = store::account_dir(&self.destination, userid).map_err(|err| {
            self.warn_account(userid, "INVALID_USERID", "plan", "", &format!("{err:#}"));
            abort(AbortStage::Userid, format!("{err:#}"))
        })?;
        let target = dir.display().to_string();

        let state = planner::inspect_account_dir(&dir).map_err(|err| {
            let (code, stage) = match err {
                PlanError::NotADirectory(_) => ("ACCOUNT_PATH_NOT_DIR", AbortStage::NotADirectory),
                PlanError::Stat { .. } => ("ACCOUNT_STAT_FAILED", AbortStage::Stat),
            };
            self.warn_account(userid, code, "plan", &target, &err.to_string());
            abort(stage, err.to_string())
        })?;
        let pages = planner::page_count(state);

        let mblogs = self.fetch_pages(userid, pages).map_err(|err| {
            self.warn_account(userid, "FETCH_FAILED", "fetch", &target, &format!("{err:#}"));
            abort(AbortStage::Fetch, format!("{err:#}"))
        })?;

        store::create_dir_all(&dir).map_err(|err| {
            self.warn_account(
                userid,
                "ACCOUNT_DIR_CREATE_FAILED",
                "prepare",
                &target,
                &format!("{err:#}"),
            );
            abort(AbortStage::CreateDir, format!("{err:#}"))
        })?;

        let mut stat = AccountStat {
            userid: userid.to_string(),
            fetched: mblogs.len(),
            ..AccountStat::default()
        };

        let groups = self.group_by_month(userid, mblogs, &mut stat);
        for (month, group) in groups {
            self.merge_month(&dir, &month, group, &mut stat);
        }

        Ok(stat)
    }

    /// Pages `1..=pages` in order; any page error discards the whole account.
    fn fetch_pages(&self, userid: &str, pages: u32) -> anyhow::Result<Vec<Mblog>> {
        let mut out = Vec::new();
        for page in 1..=pages {
            let batch = self
                .fetcher
                .fetch(userid, page, true)
                .map_err(|err| {
                    err.context(format!("failed to get mblogs for user [{userid}] page [{page}]"))
                })?;
            eprintln!(
                "weibo-archiver: fetched {} mblogs for user [{userid}] page [{page}]",
                batch.len()
            );
            out.extend(batch);
        }
        Ok(out)
    }

    fn group_by_month(
        &self,
        userid: &str,
        mblogs: Vec<Mblog>,
        stat: &mut AccountStat,
    ) -> BTreeMap<String, Vec<Mblog>> {
        let mut groups: BTreeMap<String, Vec<Mblog>> = BTreeMap::new();
        for mblog in mblogs {
            if !codec::fits_one_line(&mblog) {
                stat.failed += 1;
                self.warn_account(
                    userid,
                    "RECORD_NOT_ENCODABLE",
                    "group",
                    &mblog.mblog_id,
                    &format!(
                        "line break or separator in created_at {:?} or mblogid {:?}",
                        mblog.created_at, mblog.mblog_id
                    ),
                );
                continue;
            }
            let Some(month) = self.clock.month_key(&mblog.created_at) else {
                stat.failed += 1;
                self.warn_account(
                    userid,
                    "CREATED_AT_UNPARSABLE",
                    "group",
                    &mblog.mblog_id,
                    &format!("unparsable created_at {:?}", mblog.created_at),
                );
                continue;
            };
            groups.entry(month).or_default().push(mblog);
        }
        groups
    }

    fn merge_month(&self, dir: &Path, month: &str, group: Vec<Mblog>, stat: &mut AccountStat) {
        let file = store::month_file_path(dir, month);
        let target = file.display().to_string();
        let group_len = group.len();

        let mut existing = match self.store.load(&file) {
            Ok(records) => records,
            Err(err) => {
                stat.failed += group_len;
                self.warn_account(
                    &stat.userid,
                    "MONTH_LOAD_FAILED",
                    "merge",
                    &target,
                    &format!("{err:#}"),
                );
                return;
            }
        };

        let mut deduper = Deduper::from_records(&existing);
        let (mut skipped, mut archived) = (0usize, 0usize);
        for mblog in group {
            if deduper.observe(&mblog) {
                existing.push(mblog);
                archived += 1;
            } else {
                skipped += 1;
            }
        }

        if archived > 0 {
            if let Err(err) = self.store.save(&file, existing) {
                stat.failed += group_len;
                self.warn_account(
                    &stat.userid,
                    "MONTH_SAVE_FAILED",
                    "merge",
                    &target,
                    &format!("{err:#}"),
                );
                return;
            }
        }

        stat.skipped += skipped;
        stat.archived += archived;
    }

    fn warn_account(&self, userid: &str, code: &str, stage: &str, target: &str, err: &str) {
        warn::emit(WarnEvent {
            code,
            stage,
            action: "archive-account",
            userid,
            target,
            reason: code,
            err,
        });
    }
}
