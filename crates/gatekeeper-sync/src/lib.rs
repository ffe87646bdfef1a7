pub mod error;
pub mod prefill;
pub mod sheet;

pub use error::{Result, SyncError};
