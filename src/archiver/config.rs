use crate::archiver::clock::MonthClock;
use crate::error::ArchiverError;
use anyhow::Result;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "config.json";
pub const DEFAULT_DESTINATION: &str = "data";

/// On-disk shape of `config.json`. Unknown keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ArchiverConfig {
    #[serde(rename = "Cookie", alias = "cookie")]
    pub cookie: String,
    #[serde(rename = "Userids", alias = "userids")]
    pub userids: Vec<String>,
    #[serde(rename = "Destination", alias = "destination")]
    pub destination: String,
    #[serde(rename = "Proxy", alias = "proxy")]
    pub proxy: String,
    #[serde(rename = "Endpoint", alias = "endpoint")]
    pub endpoint: String,
    #[serde(rename = "Timezone", alias = "timezone")]
    pub timezone: String,
}

/// Config with defaults applied and values validated.
#[derive(Debug, Clone)]
pub struct ArchiverSettings {
    pub cookie: Option<String>,
    pub userids: Vec<String>,
    pub destination: PathBuf,
    pub proxy: Option<String>,
    pub endpoint: String,
    pub clock: MonthClock,
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

impl ArchiverConfig {
    pub fn resolve(self) -> Result<ArchiverSettings> {
        let clock = MonthClock::from_name(&self.timezone).ok_or_else(|| {
            ArchiverError::InvalidConfig(format!("unknown Timezone {:?}", self.timezone))
        })?;
        let destination = non_empty(&self.destination)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DESTINATION));

        Ok(ArchiverSettings {
            cookie: non_empty(&self.cookie),
            userids: self.userids,
            destination,
            proxy: non_empty(&self.proxy),
            endpoint: self.endpoint.trim().to_string(),
            clock,
        })
    }
}

pub fn parse_config(raw: &str) -> Result<ArchiverConfig> {
    serde_json::from_str(raw)
        .map_err(|err| ArchiverError::InvalidConfig(format!("failed to parse config: {err}")).into())
}

pub fn load_config(path: &Path) -> Result<ArchiverSettings> {
    let raw = fs::read_to_string(path)
        .map_err(|err| ArchiverError::ConfigMissing(format!("{}: {err}", path.display())))?;
    parse_config(&raw)?.resolve()
}
