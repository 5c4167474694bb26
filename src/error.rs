use thiserror::Error;

#[derive(Error, Debug)]
pub enum BlottoError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Unmutable strategy: {0}")]
    UnmutableStrategy(String),

    #[error("Corrupt state: {0}")]
    CorruptState(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BlottoError>;
