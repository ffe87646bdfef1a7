use crate::domain::{Candidate, CustomerRecord, NormalizedCandidate, RecordIndex};
use crate::dto::{NameMatchDto, PhoneHitDto, ResolutionDto, ResolvedRecord, Suggestion};
use crate::error::CoreError;
use crate::rules::distance::{
    fuzzy_score, phone_distance, FuzzyScore, MatchKind, CONTAINS_DISTANCE, EXACT_DISTANCE,
    PREFIX_DISTANCE, SIMILAR_BASE_DISTANCE,
};
use std::collections::HashMap;

pub const DEFAULT_RESULT_LIMIT: usize = 50;
/// Upper bound for any caller-supplied list cap.
pub const MAX_RESULT_LIMIT: usize = 500;
/// Phone hits scoring this much or more are discarded.
pub const MAX_PHONE_SCORE: f64 = 3.0;
pub const MAX_PHONE_EDITS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    pub limit: usize,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_RESULT_LIMIT,
        }
    }
}

impl ResolveOptions {
    pub fn with_limit(limit: usize) -> Result<Self, CoreError> {
        if limit == 0 || limit > MAX_RESULT_LIMIT {
            return Err(CoreError::InvalidResultLimit(limit));
        }
        Ok(Self { limit })
    }
}

/// Looks up the existing customer a (possibly partial) candidate refers to.
pub fn resolve(candidate: &Candidate, index: &RecordIndex) -> Result<ResolutionDto, CoreError> {
    resolve_with(candidate, index, ResolveOptions::default())
}

pub fn resolve_with(
    candidate: &Candidate,
    index: &RecordIndex,
    options: ResolveOptions,
) -> Result<ResolutionDto, CoreError> {
    let input = candidate.normalized();
    if input.has_phone() {
        Ok(resolve_by_phone(&input, index, options.limit))
    } else if input.has_name() {
        Ok(resolve_by_name(&input, index, options.limit))
    } else {
        Err(CoreError::InvalidQuery)
    }
}

/// Scores a stored phone against the (possibly partial) phone typed by the user.
pub fn phone_score(query: &str, phone: &str) -> FuzzyScore {
    if query.is_empty() {
        return FuzzyScore::NONE;
    }
    if phone == query {
        return FuzzyScore::new(EXACT_DISTANCE, MatchKind::Exact);
    }
    if phone.starts_with(query) {
        return FuzzyScore::new(PREFIX_DISTANCE, MatchKind::Prefix);
    }
    if phone.contains(query) {
        return FuzzyScore::new(CONTAINS_DISTANCE, MatchKind::Contains);
    }
    let edits = phone_distance(query, phone);
    if edits <= MAX_PHONE_EDITS {
        return FuzzyScore::new(SIMILAR_BASE_DISTANCE + edits as f64, MatchKind::Similar);
    }
    FuzzyScore::NONE
}

fn best_phone<'a>(record: &'a CustomerRecord, query: &str) -> Option<(&'a str, FuzzyScore)> {
    record
        .phones
        .iter()
        .map(|phone| (phone.as_str(), phone_score(query, phone)))
        .filter(|(_, score)| score.is_match() && score.distance < MAX_PHONE_SCORE)
        .fold(None, |best, (phone, score)| match best {
            Some((_, kept)) if kept.distance <= score.distance => best,
            _ => Some((phone, score)),
        })
}

fn resolve_by_phone(
    input: &NormalizedCandidate,
    index: &RecordIndex,
    limit: usize,
) -> ResolutionDto {
    let (exact, near): (Vec<PhoneHitDto>, Vec<PhoneHitDto>) = index
        .iter()
        .filter_map(|record| {
            let (phone, score) = best_phone(record, &input.phone)?;
            let is_exact = score.distance <= PREFIX_DISTANCE;
            Some(PhoneHitDto {
                id: record.id.clone(),
                full_name: record.full_name.clone(),
                phone: phone.to_string(),
                distance: score.distance,
                kind: score.kind,
                name: is_exact.then(|| fuzzy_score(&input.full, &record.norm_name)),
            })
        })
        .partition(|hit| hit.distance <= PREFIX_DISTANCE);

    let name_near: Vec<NameMatchDto> = index
        .iter()
        .filter_map(|record| {
            let score = fuzzy_score(&input.full, &record.norm_name);
            score
                .is_match()
                .then(|| NameMatchDto::from_record(record, score, index))
        })
        .collect();

    let mut exact = dedupe_by_id(exact);
    exact.sort_by(|a, b| {
        let a_name = a.name.unwrap_or(FuzzyScore::NONE);
        let b_name = b.name.unwrap_or(FuzzyScore::NONE);
        a_name
            .distance
            .total_cmp(&b_name.distance)
            .then_with(|| {
                (a_name.kind != MatchKind::Exact).cmp(&(b_name.kind != MatchKind::Exact))
            })
    });
    exact.truncate(limit);

    let mut near = dedupe_by_id(near);
    near.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    near.truncate(limit);

    let mut name_near = dedupe_by_id(name_near);
    name_near.sort_by(|a, b| a.score().rank_cmp(&b.score()));
    name_near.truncate(limit);

    if let Some(best) = exact.first().cloned() {
        return ResolutionDto {
            found: true,
            record: Some(ResolvedRecord::Phone(best)),
            suggestion: None,
            matches: exact,
            near,
            name_near,
        };
    }

    let suggestion = if !near.is_empty() {
        Suggestion::SimilarPhones
    } else if !name_near.is_empty() {
        Suggestion::SimilarNamesForPhone
    } else {
        Suggestion::PhoneNotFound
    };
    ResolutionDto {
        found: false,
        record: None,
        suggestion: Some(suggestion),
        matches: Vec::new(),
        near,
        name_near,
    }
}

fn resolve_by_name(
    input: &NormalizedCandidate,
    index: &RecordIndex,
    limit: usize,
) -> ResolutionDto {
    // Order sub-records repeat their customer's name; only base ids count here.
    let hits: Vec<NameMatchDto> = index
        .base_customers()
        .filter_map(|record| {
            let score = fuzzy_score(&input.full, &record.norm_name);
            score
                .is_match()
                .then(|| NameMatchDto::from_record(record, score, index))
        })
        .collect();

    let mut hits = dedupe_by_id(hits);
    hits.sort_by(|a, b| a.score().rank_cmp(&b.score()));

    if let [only] = hits.as_slice() {
        if only.kind == MatchKind::Exact {
            return ResolutionDto {
                found: true,
                record: Some(ResolvedRecord::Name(only.clone())),
                suggestion: None,
                matches: Vec::new(),
                near: Vec::new(),
                name_near: Vec::new(),
            };
        }
    }

    let suggestion = if hits.iter().any(|hit| hit.kind == MatchKind::Exact) {
        Suggestion::SameNameExists
    } else if !hits.is_empty() {
        Suggestion::SimilarNames
    } else {
        Suggestion::NoMatches
    };
    hits.truncate(limit);
    ResolutionDto {
        found: false,
        record: None,
        suggestion: Some(suggestion),
        matches: Vec::new(),
        near: Vec::new(),
        name_near: hits,
    }
}

trait Ranked {
    fn id(&self) -> &str;
    fn distance(&self) -> f64;
}

impl Ranked for PhoneHitDto {
    fn id(&self) -> &str {
        &self.id
    }

    fn distance(&self) -> f64 {
        self.distance
    }
}

impl Ranked for NameMatchDto {
    fn id(&self) -> &str {
        &self.id
    }

    fn distance(&self) -> f64 {
        self.distance
    }
}

/// Keeps one entry per record id, the one with the lowest distance, at the
/// position where the id first appeared. Rows without an id are kept as is.
fn dedupe_by_id<T: Ranked>(items: Vec<T>) -> Vec<T> {
    let mut out: Vec<T> = Vec::with_capacity(items.len());
    let mut positions: HashMap<String, usize> = HashMap::new();
    for item in items {
        if item.id().is_empty() {
            out.push(item);
            continue;
        }
        match positions.get(item.id()) {
            Some(&pos) => {
                if item.distance() < out[pos].distance() {
                    out[pos] = item;
                }
            }
            None => {
                positions.insert(item.id().to_string(), out.len());
                out.push(item);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{phone_score, resolve, resolve_with, ResolveOptions, MAX_RESULT_LIMIT};
    use crate::domain::{Candidate, PipelineRow, RecordIndex};
    use crate::dto::{ResolvedRecord, Suggestion};
    use crate::error::CoreError;
    use crate::rules::distance::{FuzzyScore, MatchKind};

    fn index(rows: &[(&str, &str, &str, &str)]) -> RecordIndex {
        rows.iter()
            .map(|(id, first, last, phone)| PipelineRow {
                id: id.to_string(),
                first_name: first.to_string(),
                last_name: last.to_string(),
                customer: String::new(),
                phone: phone.to_string(),
            })
            .collect()
    }

    #[test]
    fn phone_score_priorities() {
        assert_eq!(
            phone_score("3331234567", "3331234567"),
            FuzzyScore::new(0.0, MatchKind::Exact)
        );
        assert_eq!(
            phone_score("333123", "3331234567"),
            FuzzyScore::new(0.5, MatchKind::Prefix)
        );
        assert_eq!(
            phone_score("1234567", "3331234567"),
            FuzzyScore::new(1.0, MatchKind::Contains)
        );
        assert_eq!(
            phone_score("3331234568", "3331234567"),
            FuzzyScore::new(2.0, MatchKind::Similar)
        );
        assert_eq!(
            phone_score("3339999999", "3331234567").kind,
            MatchKind::None
        );
    }

    #[test]
    fn empty_query_is_rejected() {
        let index = index(&[("1", "Maria", "Rossi", "3331234567")]);
        let err = resolve(&Candidate::new(" ", "", "n/a"), &index).unwrap_err();
        assert_eq!(err, CoreError::InvalidQuery);
    }

    #[test]
    fn limits_outside_the_bounds_are_rejected() {
        assert_eq!(
            ResolveOptions::with_limit(0),
            Err(CoreError::InvalidResultLimit(0))
        );
        assert_eq!(
            ResolveOptions::with_limit(MAX_RESULT_LIMIT + 1),
            Err(CoreError::InvalidResultLimit(501))
        );
        assert_eq!(
            ResolveOptions::with_limit(MAX_RESULT_LIMIT).map(|options| options.limit),
            Ok(500)
        );
    }

    #[test]
    fn exact_phone_prefers_matching_name() {
        let index = index(&[
            ("1", "Marco", "Bianchi", "3331234567"),
            ("2", "Maria", "Rossi", "3331234567"),
        ]);
        let result = resolve(&Candidate::new("Maria", "Rossi", "3331234567"), &index)
            .expect("resolve");
        assert!(result.found);
        let record = result.record.expect("record");
        assert_eq!(record.id(), "2");
        assert_eq!(result.matches.len(), 2);
        assert_eq!(result.matches[1].id, "1");
    }

    #[test]
    fn exact_phone_without_name_keeps_source_order() {
        let index = index(&[
            ("1", "Marco", "Bianchi", "3331234567"),
            ("2", "Maria", "Rossi", "3331234567"),
        ]);
        let result = resolve(&Candidate::new("", "", "3331234567"), &index).expect("resolve");
        assert_eq!(result.record.expect("record").id(), "1");
        assert!(result.name_near.is_empty());
    }

    #[test]
    fn near_phone_is_not_found_with_suggestion() {
        let index = index(&[("1", "Luca", "Neri", "3331234567")]);
        let result = resolve(&Candidate::new("", "", "3331234568"), &index).expect("resolve");
        assert!(!result.found);
        assert_eq!(result.suggestion, Some(Suggestion::SimilarPhones));
        assert_eq!(result.near.len(), 1);
        assert_eq!(result.near[0].distance, 2.0);
        assert!(result.near[0].name.is_none());
    }

    #[test]
    fn unknown_phone_suggests_names_then_new_customer() {
        let index = index(&[("1", "Maria", "Rossi", "0611111111")]);
        let with_name =
            resolve(&Candidate::new("Maria", "Rossi", "3339999999"), &index).expect("resolve");
        assert_eq!(with_name.suggestion, Some(Suggestion::SimilarNamesForPhone));
        assert_eq!(with_name.name_near.len(), 1);

        let without_name =
            resolve(&Candidate::new("", "", "3339999999"), &index).expect("resolve");
        assert_eq!(without_name.suggestion, Some(Suggestion::PhoneNotFound));
    }

    #[test]
    fn best_phone_per_record_is_kept() {
        let index = index(&[("1", "Luca", "Neri", "3331234568, 3331234567")]);
        let result = resolve(&Candidate::new("", "", "3331234567"), &index).expect("resolve");
        assert!(result.found);
        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].phone, "3331234567");
        assert!(result.near.is_empty());
    }

    #[test]
    fn lists_are_deduplicated_by_id() {
        let index = index(&[
            ("5", "Maria", "Rosi", "3331234568"),
            ("5", "Maria", "Rossi", "3331234569"),
            ("6", "Maria", "Rossi", "0611111111"),
        ]);
        let result =
            resolve(&Candidate::new("Maria", "Rossi", "3331234567"), &index).expect("resolve");
        assert!(!result.found);
        assert_eq!(result.near.len(), 1);
        assert_eq!(result.near[0].id, "5");
        let ids: Vec<&str> = result.name_near.iter().map(|hit| hit.id.as_str()).collect();
        assert_eq!(ids, vec!["5", "6"]);
        assert_eq!(result.name_near[0].kind, MatchKind::Exact);
    }

    #[test]
    fn name_only_single_exact_is_found() {
        let index = index(&[
            ("1", "Maria", "Rossi", "3331234567"),
            ("1_01", "Maria", "Rossi", "3331234567"),
            ("2", "Paolo", "Bianchi", ""),
        ]);
        let result = resolve(&Candidate::new("maria", "rossi", ""), &index).expect("resolve");
        assert!(result.found);
        match result.record.expect("record") {
            ResolvedRecord::Name(hit) => {
                assert_eq!(hit.id, "1");
                assert_eq!(hit.phone, "3331234567");
            }
            other => panic!("unexpected record {other:?}"),
        }
    }

    #[test]
    fn name_hits_count_orders_of_their_customer() {
        let index = index(&[
            ("2", "Marco", "Bianchi", "3471112222"),
            ("2_01", "Marco", "Bianchi", "3471112222"),
            ("2_02", "Marco", "Bianchi", "3471112222"),
            ("4", "Marco", "Bianchini", ""),
        ]);
        let result = resolve(&Candidate::new("Marco", "Bianchi", ""), &index).expect("resolve");
        assert!(!result.found);
        let counts: Vec<(&str, usize)> = result
            .name_near
            .iter()
            .map(|hit| (hit.id.as_str(), hit.orders))
            .collect();
        assert_eq!(counts, vec![("2", 2), ("4", 0)]);

        let by_phone =
            resolve(&Candidate::new("Marco", "Bianchi", "0600000000"), &index).expect("resolve");
        let order_hit = by_phone
            .name_near
            .iter()
            .find(|hit| hit.id == "2_01")
            .expect("sub-record hit");
        assert_eq!(order_hit.orders, 0);
    }

    #[test]
    fn name_only_with_homonyms_is_ambiguous() {
        let index = index(&[
            ("1", "Maria", "Rossi", ""),
            ("2", "Maria", "Rossi", ""),
            ("3", "Maria", "Rosi", ""),
        ]);
        let result = resolve(&Candidate::new("Maria", "Rossi", ""), &index).expect("resolve");
        assert!(!result.found);
        assert_eq!(result.suggestion, Some(Suggestion::SameNameExists));
        assert_eq!(result.name_near.len(), 3);
    }

    #[test]
    fn name_only_exact_plus_similar_is_ambiguous() {
        let index = index(&[("1", "Maria", "Rossi", ""), ("3", "Maria", "Rosi", "")]);
        let result = resolve(&Candidate::new("Maria", "Rossi", ""), &index).expect("resolve");
        assert!(!result.found);
        assert_eq!(result.suggestion, Some(Suggestion::SameNameExists));
    }

    #[test]
    fn name_only_similar_and_empty_suggestions() {
        let index = index(&[("3", "Maria", "Rosi", "")]);
        let similar = resolve(&Candidate::new("Maria", "Rossi", ""), &index).expect("resolve");
        assert_eq!(similar.suggestion, Some(Suggestion::SimilarNames));

        let nothing = resolve(&Candidate::new("Zeno", "Cosini", ""), &index).expect("resolve");
        assert_eq!(nothing.suggestion, Some(Suggestion::NoMatches));
        assert!(nothing.name_near.is_empty());
    }

    #[test]
    fn result_lists_are_capped() {
        let rows: Vec<(String, String)> = (0..20)
            .map(|i| (i.to_string(), format!("Rossi{}", "i".repeat(i % 3))))
            .collect();
        let index: RecordIndex = rows
            .iter()
            .map(|(id, last)| PipelineRow {
                id: id.clone(),
                first_name: "Maria".to_string(),
                last_name: last.clone(),
                ..Default::default()
            })
            .collect();
        let options = ResolveOptions::with_limit(5).expect("limit");
        let result =
            resolve_with(&Candidate::new("Maria", "Rossi", ""), &index, options).expect("resolve");
        assert_eq!(result.name_near.len(), 5);
        assert_eq!(result.suggestion, Some(Suggestion::SameNameExists));
    }
}
