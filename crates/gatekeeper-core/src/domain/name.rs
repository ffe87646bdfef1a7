use unicode_normalization::UnicodeNormalization;

/// Reduces a name to a single unspaced lower-case ASCII token.
///
/// Diacritics are stripped through NFD decomposition, every character that is
/// not a letter is dropped and the remaining words are glued together, so
/// `"  Zoë  D'Angelo "` becomes `"zoedangelo"`. The result is only meant for
/// equality and distance comparisons.
pub fn normalize_name(value: &str) -> String {
    value
        .to_lowercase()
        .nfd()
        .filter(|ch| ch.is_ascii_lowercase())
        .collect()
}

/// Normalized form of a first and last name taken together.
pub fn normalize_full_name(first: &str, last: &str) -> String {
    let mut out = normalize_name(first);
    out.push_str(&normalize_name(last));
    out
}

/// Human-facing cleanup used when a name leaves the engine (prefilled forms).
pub fn display_name(value: &str) -> String {
    let mut out = String::new();
    for word in value.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(&chars.as_str().to_lowercase());
        }
    }
    out
}
