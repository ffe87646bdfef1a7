//! Duplicate detection for customer records.
//!
//! [`classify`] answers "is this new customer already on file?", [`resolve`]
//! answers "which existing customer is this?". Both work on an immutable
//! [`RecordIndex`] built from the rows of the record source and never mutate it.

pub mod domain;
pub mod dto;
pub mod error;
pub mod rules;

pub use domain::*;
pub use dto::*;
pub use error::CoreError;
pub use rules::*;
