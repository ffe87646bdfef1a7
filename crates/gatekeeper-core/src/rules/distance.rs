use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Returned by [`phone_distance`] when two numbers differ in length by more
/// than one digit.
pub const PHONE_LENGTH_GAP_DISTANCE: usize = 2;
pub const MAX_PHONE_LENGTH_GAP: usize = 1;

pub const EXACT_DISTANCE: f64 = 0.0;
pub const PREFIX_DISTANCE: f64 = 0.5;
pub const CONTAINS_DISTANCE: f64 = 1.0;
/// Similar matches score `SIMILAR_BASE_DISTANCE + edit distance`.
pub const SIMILAR_BASE_DISTANCE: f64 = 1.0;
pub const NO_MATCH_DISTANCE: f64 = 999.0;

pub const SHORT_QUERY_MAX_CHARS: usize = 3;
pub const SHORT_QUERY_THRESHOLD: f64 = 0.7;
pub const MEDIUM_QUERY_MAX_CHARS: usize = 5;
pub const MEDIUM_QUERY_THRESHOLD: f64 = 0.5;
pub const LONG_QUERY_THRESHOLD: f64 = 0.3;

/// Levenshtein distance with unit costs, counted in chars.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }
    levenshtein(&a, &b)
}

/// Edit distance between two canonical phone numbers, short-circuited for
/// numbers whose lengths are too far apart to be typos of each other.
pub fn phone_distance(a: &str, b: &str) -> usize {
    if a.is_empty() || b.is_empty() {
        return a.len().max(b.len());
    }
    if a.len().abs_diff(b.len()) > MAX_PHONE_LENGTH_GAP {
        return PHONE_LENGTH_GAP_DISTANCE;
    }
    edit_distance(a, b)
}

fn levenshtein(a: &[char], b: &[char]) -> usize {
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// How a query relates to a target. Variants are ordered by precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Exact,
    Prefix,
    Contains,
    Similar,
    None,
}

impl MatchKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            MatchKind::Exact => "exact",
            MatchKind::Prefix => "prefix",
            MatchKind::Contains => "contains",
            MatchKind::Similar => "similar",
            MatchKind::None => "none",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FuzzyScore {
    pub distance: f64,
    pub kind: MatchKind,
}

impl FuzzyScore {
    pub const NONE: FuzzyScore = FuzzyScore {
        distance: NO_MATCH_DISTANCE,
        kind: MatchKind::None,
    };

    pub const fn new(distance: f64, kind: MatchKind) -> Self {
        Self { distance, kind }
    }

    pub fn is_match(&self) -> bool {
        self.kind != MatchKind::None
    }

    /// Kind precedence first, then distance.
    pub fn rank_cmp(&self, other: &FuzzyScore) -> Ordering {
        self.kind
            .cmp(&other.kind)
            .then_with(|| self.distance.total_cmp(&other.distance))
    }

    /// Joins per-part scores. Both parts must match; the worse distance wins
    /// and the kind survives only when both parts agree on it.
    pub fn combine(first: FuzzyScore, second: FuzzyScore) -> FuzzyScore {
        if !first.is_match() || !second.is_match() {
            return FuzzyScore::NONE;
        }
        let kind = match (first.kind, second.kind) {
            (a, b) if a == b => a,
            _ => MatchKind::Similar,
        };
        FuzzyScore::new(first.distance.max(second.distance), kind)
    }
}

/// Blended score of `query` against `target`; both are expected to be
/// normalized already.
pub fn fuzzy_score(query: &str, target: &str) -> FuzzyScore {
    if query.is_empty() {
        return FuzzyScore::NONE;
    }
    if query == target {
        return FuzzyScore::new(EXACT_DISTANCE, MatchKind::Exact);
    }
    if target.starts_with(query) {
        return FuzzyScore::new(PREFIX_DISTANCE, MatchKind::Prefix);
    }
    if target.contains(query) {
        return FuzzyScore::new(CONTAINS_DISTANCE, MatchKind::Contains);
    }

    let query_len = query.chars().count();
    let target_len = target.chars().count();
    let distance = edit_distance(query, target);
    let normalized = distance as f64 / query_len.max(target_len) as f64;
    if normalized < similarity_threshold(query_len) {
        return FuzzyScore::new(SIMILAR_BASE_DISTANCE + distance as f64, MatchKind::Similar);
    }
    FuzzyScore::NONE
}

/// Short queries tolerate proportionally more edits than long ones.
pub fn similarity_threshold(query_len: usize) -> f64 {
    if query_len <= SHORT_QUERY_MAX_CHARS {
        SHORT_QUERY_THRESHOLD
    } else if query_len <= MEDIUM_QUERY_MAX_CHARS {
        MEDIUM_QUERY_THRESHOLD
    } else {
        LONG_QUERY_THRESHOLD
    }
}

#[cfg(test)]
mod tests {
    use super::{
        edit_distance, fuzzy_score, phone_distance, similarity_threshold, FuzzyScore, MatchKind,
        NO_MATCH_DISTANCE, PHONE_LENGTH_GAP_DISTANCE,
    };

    #[test]
    fn edit_distance_basics() {
        assert_eq!(edit_distance("", ""), 0);
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("abc", ""), 3);
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("rossi", "rosi"), 1);
        assert_eq!(edit_distance("zoë", "zoe"), 1);
    }

    #[test]
    fn edit_distance_is_symmetric_and_reflexive() {
        let words = ["", "maria", "mario", "mariarossi", "rossimaria", "bianchi"];
        for a in words {
            assert_eq!(edit_distance(a, a), 0);
            for b in words {
                assert_eq!(edit_distance(a, b), edit_distance(b, a), "{a} vs {b}");
            }
        }
    }

    #[test]
    fn phone_distance_handles_empty_sides() {
        assert_eq!(phone_distance("", "3331234567"), 10);
        assert_eq!(phone_distance("333", ""), 3);
        assert_eq!(phone_distance("", ""), 0);
    }

    #[test]
    fn phone_distance_short_circuits_on_length_gap() {
        assert_eq!(phone_distance("3331234567", "33312345"), PHONE_LENGTH_GAP_DISTANCE);
        assert_eq!(phone_distance("1234567", "9999999999"), PHONE_LENGTH_GAP_DISTANCE);
    }

    #[test]
    fn phone_distance_matches_edit_distance_within_gap() {
        let pairs = [
            ("3331234567", "3331234568"),
            ("3331234567", "333123456"),
            ("3331234567", "3339876543"),
            ("0298765432", "029876543"),
        ];
        for (a, b) in pairs {
            assert_eq!(phone_distance(a, b), edit_distance(a, b), "{a} vs {b}");
        }
        assert_eq!(phone_distance("3331234567", "3331234568"), 1);
    }

    #[test]
    fn fuzzy_score_is_reflexive() {
        for word in ["a", "gio", "mariarossi"] {
            assert_eq!(fuzzy_score(word, word), FuzzyScore::new(0.0, MatchKind::Exact));
        }
    }

    #[test]
    fn fuzzy_score_prefix_and_contains() {
        assert_eq!(
            fuzzy_score("gio", "giovanniverdi"),
            FuzzyScore::new(0.5, MatchKind::Prefix)
        );
        assert_eq!(
            fuzzy_score("verdi", "giovanniverdi"),
            FuzzyScore::new(1.0, MatchKind::Contains)
        );
    }

    #[test]
    fn fuzzy_score_similar_uses_edit_distance() {
        assert_eq!(
            fuzzy_score("mariarosi", "mariarossi"),
            FuzzyScore::new(2.0, MatchKind::Similar)
        );
        assert_eq!(fuzzy_score("rossi", "russo"), FuzzyScore::new(3.0, MatchKind::Similar));
    }

    #[test]
    fn fuzzy_score_rejects_distant_strings() {
        let score = fuzzy_score("mariarossi", "marcobianchi");
        assert_eq!(score.kind, MatchKind::None);
        assert_eq!(score.distance, NO_MATCH_DISTANCE);
        assert!(!fuzzy_score("", "anything").is_match());
    }

    #[test]
    fn similarity_threshold_tightens_with_length() {
        assert_eq!(similarity_threshold(1), 0.7);
        assert_eq!(similarity_threshold(3), 0.7);
        assert_eq!(similarity_threshold(4), 0.5);
        assert_eq!(similarity_threshold(5), 0.5);
        assert_eq!(similarity_threshold(6), 0.3);
    }

    #[test]
    fn combine_requires_both_parts() {
        let exact = FuzzyScore::new(0.0, MatchKind::Exact);
        let prefix = FuzzyScore::new(0.5, MatchKind::Prefix);
        assert_eq!(FuzzyScore::combine(exact, FuzzyScore::NONE), FuzzyScore::NONE);
        assert_eq!(FuzzyScore::combine(exact, exact), exact);
        assert_eq!(FuzzyScore::combine(prefix, prefix), prefix);
        assert_eq!(
            FuzzyScore::combine(exact, prefix),
            FuzzyScore::new(0.5, MatchKind::Similar)
        );
    }

    #[test]
    fn rank_orders_by_kind_then_distance() {
        let mut scores = vec![
            FuzzyScore::new(2.0, MatchKind::Similar),
            FuzzyScore::new(1.0, MatchKind::Contains),
            FuzzyScore::new(0.0, MatchKind::Exact),
            FuzzyScore::new(0.5, MatchKind::Similar),
        ];
        scores.sort_by(|a, b| a.rank_cmp(b));
        let kinds: Vec<MatchKind> = scores.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                MatchKind::Exact,
                MatchKind::Contains,
                MatchKind::Similar,
                MatchKind::Similar
            ]
        );
        assert_eq!(scores[2].distance, 0.5);
    }
}
