use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(
        "Seat {index} was not confirmed: expected more than {baseline} selected seats within {timeout:?}"
    )]
    SelectionTimeout {
        index: usize,
        baseline: usize,
        timeout: Duration,
    },

    #[error("No seat control at index {index} (marker '{marker}')")]
    ElementNotFound { index: usize, marker: String },

    #[error("Timed out after {timeout:?} waiting for {condition}")]
    WaitTimeout { condition: String, timeout: Duration },

    #[error("Check failed: {0}")]
    CheckFailed(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Browser driver error: {0}")]
    Driver(String),

    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
