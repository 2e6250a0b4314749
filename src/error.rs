use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("stored quotes could not be parsed: {0}")]
    StorageParse(#[source] serde_json::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("invalid import format: {0}")]
    InvalidFormat(String),

    #[error("remote unavailable: {0}")]
    RemoteUnavailable(String),
}

impl From<reqwest::Error> for QuoteError {
    fn from(e: reqwest::Error) -> Self {
        QuoteError::RemoteUnavailable(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, QuoteError>;
