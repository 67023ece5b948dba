//! Error types for run-control

use thiserror::Error;
use tstamp::CfgError;

/// Errors that can occur while coordinating a run
#[derive(Error, Debug)]
pub enum RunControlError {
    #[error("Configuration error: {0}")]
    Config(#[from] CfgError),

    #[error("Unknown event id {event_id}")]
    UnknownEventId { event_id: u16 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Config serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}
