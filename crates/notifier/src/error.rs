// In crates/notifier/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to build the notifier client: {0}")]
    ClientBuildError(String),
    #[error("Notifier is not configured: bot token or chat id is missing")]
    NotConfigured,
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("Message rejected with status {status}: {description}")]
    Rejected { status: u16, description: String },
}

pub type Result<T> = std::result::Result<T, Error>;
