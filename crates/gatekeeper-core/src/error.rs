use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid query: provide at least a first name, a last name or a phone number")]
    InvalidQuery,
    #[error(
        "invalid result limit: {0} (allowed 1 to {max})",
        max = crate::rules::resolve::MAX_RESULT_LIMIT
    )]
    InvalidResultLimit(usize),
}
