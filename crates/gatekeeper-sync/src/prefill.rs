use crate::error::Result;
use gatekeeper_core::domain::{canonical_phone, display_name};
use url::Url;

/// Target form and the question ids each field is written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefillForm {
    pub url: String,
    pub new_customer_yes: String,
    pub new_customer_no: String,
    pub entries: PrefillEntries,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefillEntries {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub new_customer: String,
    pub customer_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomerStatus {
    New,
    Existing(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefillRequest {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub status: CustomerStatus,
}

/// Builds the prefilled form link. Empty values and empty entry ids are left
/// out; the base URL is returned untouched when nothing is added.
pub fn build_prefill_url(form: &PrefillForm, request: &PrefillRequest) -> Result<String> {
    let mut url = Url::parse(form.url.trim())?;

    let (option, customer_id) = match &request.status {
        CustomerStatus::New => (form.new_customer_yes.as_str(), String::new()),
        CustomerStatus::Existing(id) => (form.new_customer_no.as_str(), id.trim().to_string()),
    };
    let fields = [
        (&form.entries.first_name, display_name(&request.first_name)),
        (&form.entries.last_name, display_name(&request.last_name)),
        (&form.entries.phone, canonical_phone(&request.phone)),
        (&form.entries.new_customer, option.to_string()),
        (&form.entries.customer_id, customer_id),
    ];

    let pairs: Vec<(&str, String)> = fields
        .into_iter()
        .filter(|(entry, value)| !entry.trim().is_empty() && !value.is_empty())
        .map(|(entry, value)| (entry.trim(), value))
        .collect();

    if !pairs.is_empty() {
        let mut query = url.query_pairs_mut();
        for (entry, value) in &pairs {
            query.append_pair(entry, value);
        }
    }

    Ok(url.into())
}
