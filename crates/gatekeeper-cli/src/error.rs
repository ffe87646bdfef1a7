use anyhow::Error;
use gatekeeper_config::ConfigError;
use gatekeeper_core::CoreError;
use gatekeeper_store::error::{StoreError, StoreErrorKind};
use gatekeeper_sync::error::SyncError;
use std::error::Error as StdError;
use std::process::ExitCode;
use thiserror::Error as ThisError;

/// Process exit statuses, from the most specific cause in the error chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Failure = 1,
    NotFound = 2,
    InvalidInput = 3,
}

impl From<Exit> for ExitCode {
    fn from(exit: Exit) -> Self {
        ExitCode::from(exit as u8)
    }
}

#[derive(Debug, ThisError)]
pub enum CliError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("not found: {0}")]
    NotFound(String),
}

pub fn invalid_input(message: impl Into<String>) -> Error {
    CliError::InvalidInput(message.into()).into()
}

pub fn not_found(message: impl Into<String>) -> Error {
    CliError::NotFound(message.into()).into()
}

pub fn report_error(err: &Error, verbose: bool) {
    if verbose {
        eprintln!("error: {:#}", err);
    } else {
        eprintln!("error: {}", err);
    }
}

pub fn exit_for(err: &Error) -> Exit {
    err.chain().find_map(cause_exit).unwrap_or(Exit::Failure)
}

fn cause_exit(cause: &(dyn StdError + 'static)) -> Option<Exit> {
    if let Some(err) = cause.downcast_ref::<CliError>() {
        return Some(match err {
            CliError::InvalidInput(_) => Exit::InvalidInput,
            CliError::NotFound(_) => Exit::NotFound,
        });
    }
    if let Some(err) = cause.downcast_ref::<StoreError>() {
        return Some(store_exit(err));
    }
    if let Some(err) = cause.downcast_ref::<ConfigError>() {
        return Some(config_exit(err));
    }
    if let Some(err) = cause.downcast_ref::<SyncError>() {
        return Some(sync_exit(err));
    }
    // Rejected queries and result limits from the lookup engine.
    cause
        .downcast_ref::<CoreError>()
        .map(|_| Exit::InvalidInput)
}

fn store_exit(err: &StoreError) -> Exit {
    match err.kind() {
        StoreErrorKind::InvalidTableName | StoreErrorKind::InvalidDataPath => Exit::InvalidInput,
        StoreErrorKind::MissingDatabase
        | StoreErrorKind::MissingTable
        | StoreErrorKind::MissingHomeDir
        | StoreErrorKind::Migration
        | StoreErrorKind::Sql
        | StoreErrorKind::Io => Exit::Failure,
    }
}

fn config_exit(err: &ConfigError) -> Exit {
    match err {
        ConfigError::MissingHomeDir => Exit::Failure,
        ConfigError::InvalidConfigPath(_)
        | ConfigError::MissingConfigFile(_)
        | ConfigError::InsecurePermissions(_)
        | ConfigError::InvalidPipelineTable(_)
        | ConfigError::InvalidResultLimit(_)
        | ConfigError::InvalidFormField { .. }
        | ConfigError::Read { .. }
        | ConfigError::Parse { .. } => Exit::InvalidInput,
    }
}

fn sync_exit(err: &SyncError) -> Exit {
    match err {
        SyncError::Io(_) => Exit::Failure,
        SyncError::Csv(_) | SyncError::Parse(_) | SyncError::Url(_) => Exit::InvalidInput,
    }
}
