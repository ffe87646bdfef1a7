use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("sqlite error: {0}")]
    Sql(#[from] rusqlite::Error),
    #[error("missing home directory")]
    MissingHomeDir,
    #[error("migration error: {0}")]
    Migration(String),
    #[error("invalid data path: {0}")]
    InvalidDataPath(PathBuf),
    #[error("pipeline database not found: {0} (import a pipeline csv first)")]
    MissingDatabase(PathBuf),
    #[error("invalid table name: {0}")]
    InvalidTableName(String),
    #[error("pipeline table not found: {0}")]
    MissingTable(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    Io,
    Sql,
    MissingHomeDir,
    Migration,
    InvalidDataPath,
    MissingDatabase,
    InvalidTableName,
    MissingTable,
}

impl StoreError {
    pub fn kind(&self) -> StoreErrorKind {
        match self {
            StoreError::Io(_) => StoreErrorKind::Io,
            StoreError::Sql(_) => StoreErrorKind::Sql,
            StoreError::MissingHomeDir => StoreErrorKind::MissingHomeDir,
            StoreError::Migration(_) => StoreErrorKind::Migration,
            StoreError::InvalidDataPath(_) => StoreErrorKind::InvalidDataPath,
            StoreError::MissingDatabase(_) => StoreErrorKind::MissingDatabase,
            StoreError::InvalidTableName(_) => StoreErrorKind::InvalidTableName,
            StoreError::MissingTable(_) => StoreErrorKind::MissingTable,
        }
    }
}
