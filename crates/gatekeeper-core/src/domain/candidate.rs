use crate::domain::name::{normalize_full_name, normalize_name};
use crate::domain::phone::canonical_phone;
use serde::{Deserialize, Serialize};

/// Customer data submitted for a duplicate check or an existing-customer lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
}

impl Candidate {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            phone: phone.into(),
        }
    }

    pub fn normalized(&self) -> NormalizedCandidate {
        NormalizedCandidate {
            first: normalize_name(&self.first_name),
            last: normalize_name(&self.last_name),
            full: normalize_full_name(&self.first_name, &self.last_name),
            phone: canonical_phone(&self.phone),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedCandidate {
    pub first: String,
    pub last: String,
    pub full: String,
    pub phone: String,
}

impl NormalizedCandidate {
    pub fn has_phone(&self) -> bool {
        !self.phone.is_empty()
    }

    pub fn has_name(&self) -> bool {
        !self.full.is_empty()
    }
}
