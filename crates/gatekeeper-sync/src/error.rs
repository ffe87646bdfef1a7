use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("invalid form url: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, SyncError>;
