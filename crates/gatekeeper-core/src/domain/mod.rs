pub mod candidate;
pub mod name;
pub mod phone;
pub mod record;

pub use candidate::{Candidate, NormalizedCandidate};
pub use name::{display_name, normalize_full_name, normalize_name};
pub use phone::{canonical_phone, parse_phones, MIN_PHONE_DIGITS};
pub use record::{
    is_valid_table_name, CustomerRecord, PipelineRow, RecordIndex, SUB_RECORD_SEPARATOR,
};
