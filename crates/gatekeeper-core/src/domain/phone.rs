/// Phone numbers shorter than this are not treated as identities.
pub const MIN_PHONE_DIGITS: usize = 7;

const INTERNATIONAL_PREFIX: &str = "0039";
const COUNTRY_CODE: &str = "39";

/// Digits-only phone with the Italian country code removed.
pub fn canonical_phone(value: &str) -> String {
    let digits: String = value.chars().filter(|ch| ch.is_ascii_digit()).collect();
    if let Some(rest) = digits.strip_prefix(INTERNATIONAL_PREFIX) {
        return rest.to_string();
    }
    if let Some(rest) = digits.strip_prefix(COUNTRY_CODE) {
        return rest.to_string();
    }
    digits
}

/// Extracts every distinct canonical phone number from a free-text cell.
pub fn parse_phones(value: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for token in value.split(|ch: char| !ch.is_ascii_digit()) {
        if token.len() < MIN_PHONE_DIGITS {
            continue;
        }
        let phone = canonical_phone(token);
        if phone.len() < MIN_PHONE_DIGITS || out.contains(&phone) {
            continue;
        }
        out.push(phone);
    }
    out
}
