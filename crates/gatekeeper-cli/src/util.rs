use crate::commands::CandidateArgs;
use crate::error::invalid_input;
use anyhow::Result;
use chrono::Utc;
use gatekeeper_core::domain::canonical_phone;

pub const MIN_SEARCH_NAME_CHARS: usize = 2;
pub const MIN_SEARCH_PHONE_DIGITS: usize = 3;

pub fn now_utc() -> i64 {
    Utc::now().timestamp()
}

/// Checks every lookup must pass before reaching the engine.
pub fn validate_search(args: &CandidateArgs) -> Result<()> {
    let phone = args.phone.trim();
    let digits = canonical_phone(phone);

    let has_name = long_enough(&args.first_name) || long_enough(&args.last_name);
    if !has_name && digits.len() < MIN_SEARCH_PHONE_DIGITS {
        return Err(invalid_input(format!(
            "enter at least {MIN_SEARCH_NAME_CHARS} letters of a first or last name, \
             or {MIN_SEARCH_PHONE_DIGITS} digits of a phone number"
        )));
    }

    if !phone.is_empty() {
        if !phone.chars().all(is_phone_char) {
            return Err(invalid_input(
                "phone may only contain digits, spaces, dashes, parentheses and a plus sign",
            ));
        }
        if digits.len() < MIN_SEARCH_PHONE_DIGITS {
            return Err(invalid_input(format!(
                "phone must contain at least {MIN_SEARCH_PHONE_DIGITS} digits once normalized"
            )));
        }
    }
    Ok(())
}

/// A new customer needs every field filled in.
pub fn validate_new_customer(args: &CandidateArgs) -> Result<()> {
    let complete = long_enough(&args.first_name)
        && long_enough(&args.last_name)
        && canonical_phone(&args.phone).len() >= MIN_SEARCH_PHONE_DIGITS;
    if !complete {
        return Err(invalid_input(format!(
            "a new customer needs first name, last name and phone \
             (at least {MIN_SEARCH_NAME_CHARS} letters and {MIN_SEARCH_PHONE_DIGITS} digits)"
        )));
    }
    Ok(())
}

fn long_enough(value: &str) -> bool {
    value.trim().chars().count() >= MIN_SEARCH_NAME_CHARS
}

fn is_phone_char(ch: char) -> bool {
    ch.is_ascii_digit() || ch.is_whitespace() || matches!(ch, '(' | ')' | '+' | '-')
}
