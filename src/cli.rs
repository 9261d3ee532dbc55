use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use crate::archiver::config::DEFAULT_CONFIG_FILE;
use crate::commands::CommandReport;
use crate::commands::archive::{self, ArchiveOptions};

#[derive(Debug, Parser)]
#[command(
    name = "weibo-archiver",
    version,
    about = "Archive Weibo timelines into de-duplicated per-month text files"
)]
struct Cli {
    /// Path to the JSON config file.
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Print the run report as JSON.
    #[arg(long)]
    json: bool,
}

fn render_text(report: &CommandReport) -> String {
    let mut out = format!(
        "{}: {}\n",
        report.command,
        if report.ok { "ok" } else { "completed with issues" }
    );
    for detail in &report.details {
        out.push_str(&format!("  - {detail}\n"));
    }
    for issue in &report.issues {
        out.push_str(&format!("  ! {issue}\n"));
    }
    out
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let report = archive::run(&ArchiveOptions {
        config_path: cli.config,
    })?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_text(&report));
    }

    // Per-account failures are already in the report; they do not change
    // the exit status.
    Ok(())
}
