pub mod classify;
pub mod distance;
pub mod resolve;

pub use classify::classify;
pub use distance::{edit_distance, fuzzy_score, phone_distance, FuzzyScore, MatchKind};
pub use resolve::{
    phone_score, resolve, resolve_with, ResolveOptions, DEFAULT_RESULT_LIMIT, MAX_RESULT_LIMIT,
};
