use anyhow::Result;
use std::path::PathBuf;

use crate::archiver::config::load_config;
use crate::archiver::driver::Archiver;
use crate::archiver::lock;
use crate::archiver::store::{self, FsMonthStore};
use crate::commands::CommandReport;
use crate::error::ArchiverError;
use crate::weibo::{Client, ClientOptions};

#[derive(Debug, Clone)]
pub struct ArchiveOptions {
    pub config_path: PathBuf,
}

pub fn run(opts: &ArchiveOptions) -> Result<CommandReport> {
    let settings = load_config(&opts.config_path)?;

    store::create_dir_all(&settings.destination)
        .map_err(|err| ArchiverError::DestinationUnavailable(format!("{err:#}")))?;
    let guard = lock::acquire(&settings.destination)?;

    let client = Client::new(&ClientOptions {
        endpoint: settings.endpoint.clone(),
        cookie: settings.cookie.clone(),
        proxy: settings.proxy.clone(),
    })
    .map_err(|err| ArchiverError::InvalidConfig(format!("{err:#}")))?;

    let mut report = CommandReport::new("archive");
    report.detail(format!("config={}", opts.config_path.display()));
    report.detail(format!("destination={}", settings.destination.display()));
    report.detail(format!("lock={}", guard.path().display()));
    report.detail(format!("accounts={}", settings.userids.len()));

    let archiver = Archiver::new(
        &client,
        &FsMonthStore,
        settings.destination.clone(),
        settings.clock,
    );
    let outcome = archiver.run(&settings.userids);

    for stat in outcome.stats() {
        let line = stat.summary_line();
        eprintln!("{line}");
        report.detail(line);
    }
    for abort in outcome.aborts() {
        report.issue(abort.to_string());
    }

    Ok(report)
}
