use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchiverError {
    #[error("config file missing or unreadable: {0}")]
    ConfigMissing(String),
    #[error("config file invalid: {0}")]
    InvalidConfig(String),
    #[error("destination directory unavailable: {0}")]
    DestinationUnavailable(String),
    #[error("destination is locked by another run: {0}")]
    DestinationLocked(String),
}
