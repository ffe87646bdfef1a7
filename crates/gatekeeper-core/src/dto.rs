use crate::domain::{CustomerRecord, RecordIndex};
use crate::rules::distance::{FuzzyScore, MatchKind};
use serde::{Serialize, Serializer};

/// A record reached through one of its phone numbers by the classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhoneMatchDto {
    pub id: String,
    pub full_name: String,
    pub phone: String,
    pub distance: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_distance: Option<usize>,
}

/// A record reached through its name.
///
/// `orders` counts the order sub-records filed under the hit's id, so the
/// operator can tell a long-standing customer from a one-off entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NameMatchDto {
    pub id: String,
    pub full_name: String,
    pub phone: String,
    pub distance: f64,
    pub kind: MatchKind,
    pub orders: usize,
}

impl NameMatchDto {
    pub fn from_record(record: &CustomerRecord, score: FuzzyScore, index: &RecordIndex) -> Self {
        Self {
            id: record.id.clone(),
            full_name: record.full_name.clone(),
            phone: record.primary_phone().to_string(),
            distance: score.distance,
            kind: score.kind,
            orders: index.order_count(&record.id),
        }
    }

    pub fn score(&self) -> FuzzyScore {
        FuzzyScore::new(self.distance, self.kind)
    }
}

/// A record reached by the resolver through its best-scoring phone number.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhoneHitDto {
    pub id: String,
    pub full_name: String,
    pub phone: String,
    pub distance: f64,
    pub kind: MatchKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<FuzzyScore>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    PhoneExactNameDiff,
    PhoneExact,
    PhoneNear,
    NameNear,
    Clear,
}

impl DecisionReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            DecisionReason::PhoneExactNameDiff => "phone_exact_name_diff",
            DecisionReason::PhoneExact => "phone_exact",
            DecisionReason::PhoneNear => "phone_near",
            DecisionReason::NameNear => "name_near",
            DecisionReason::Clear => "clear",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    ExactSame { record: PhoneMatchDto },
    WarnConfirm { reason: DecisionReason },
    Ok { reason: DecisionReason },
}

impl Decision {
    pub const fn label(&self) -> &'static str {
        match self {
            Decision::ExactSame { .. } => "EXACT_SAME",
            Decision::WarnConfirm { .. } => "WARN_CONFIRM",
            Decision::Ok { .. } => "OK",
        }
    }

    pub const fn reason(&self) -> Option<DecisionReason> {
        match self {
            Decision::ExactSame { .. } => None,
            Decision::WarnConfirm { reason } | Decision::Ok { reason } => Some(*reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationDto {
    #[serde(flatten)]
    pub decision: Decision,
    pub matches: Vec<PhoneMatchDto>,
    pub near: Vec<NameMatchDto>,
}

/// Advice returned with an unsuccessful lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Suggestion {
    PhoneNotFound,
    SimilarPhones,
    SimilarNamesForPhone,
    SameNameExists,
    SimilarNames,
    NoMatches,
}

impl Suggestion {
    pub const fn as_str(self) -> &'static str {
        match self {
            Suggestion::PhoneNotFound => "phone-not-found",
            Suggestion::SimilarPhones => "similar-phones",
            Suggestion::SimilarNamesForPhone => "similar-names-for-phone",
            Suggestion::SameNameExists => "same-name-exists",
            Suggestion::SimilarNames => "similar-names",
            Suggestion::NoMatches => "no-matches",
        }
    }

    pub const fn message(self) -> &'static str {
        match self {
            Suggestion::PhoneNotFound => "Phone number not on file: insert it as a new customer.",
            Suggestion::SimilarPhones => {
                "Phone number not on file, but similar numbers exist. Check them before inserting a new customer."
            }
            Suggestion::SimilarNamesForPhone => {
                "Phone number not on file, but customers with similar names exist. Check them before inserting a new customer."
            }
            Suggestion::SameNameExists => {
                "Customers with the same name already exist. Pick the right one or complete the fields."
            }
            Suggestion::SimilarNames => {
                "Similar names were found. Check the list before inserting a new customer."
            }
            Suggestion::NoMatches => "No similar customer found. You can proceed with a new entry.",
        }
    }
}

impl Serialize for Suggestion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.message())
    }
}

/// Best record of a successful lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResolvedRecord {
    Phone(PhoneHitDto),
    Name(NameMatchDto),
}

impl ResolvedRecord {
    pub fn id(&self) -> &str {
        match self {
            ResolvedRecord::Phone(hit) => &hit.id,
            ResolvedRecord::Name(hit) => &hit.id,
        }
    }

    pub fn full_name(&self) -> &str {
        match self {
            ResolvedRecord::Phone(hit) => &hit.full_name,
            ResolvedRecord::Name(hit) => &hit.full_name,
        }
    }

    pub fn phone(&self) -> &str {
        match self {
            ResolvedRecord::Phone(hit) => &hit.phone,
            ResolvedRecord::Name(hit) => &hit.phone,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionDto {
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<ResolvedRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<Suggestion>,
    pub matches: Vec<PhoneHitDto>,
    pub near: Vec<PhoneHitDto>,
    pub name_near: Vec<NameMatchDto>,
}
