use crate::domain::{Candidate, NormalizedCandidate, RecordIndex};
use crate::dto::{ClassificationDto, Decision, DecisionReason, NameMatchDto, PhoneMatchDto};
use crate::rules::distance::{edit_distance, fuzzy_score, phone_distance, FuzzyScore};

const PHONE_EXACT: usize = 0;
const PHONE_NEAR: usize = 1;

/// Decides whether `candidate` duplicates a record of `index`.
///
/// Rules are evaluated in order and the first one that applies names the
/// decision; the weaker signals still travel in `matches` and `near`:
///
/// 1. a record with the same phone and the same normalized name: `EXACT_SAME`;
/// 2. any record with the same phone: `WARN_CONFIRM` (`phone_exact_name_diff`
///    or `phone_exact`);
/// 3. a record whose phone is one edit away: `WARN_CONFIRM` (`phone_near`);
/// 4. a record whose first *and* last name both fuzzy-match:
///    `WARN_CONFIRM` (`name_near`);
/// 5. otherwise `OK` (`clear`).
pub fn classify(candidate: &Candidate, index: &RecordIndex) -> ClassificationDto {
    let input = candidate.normalized();
    let (phone_exact, phone_near) = phone_hits(&input, index);
    let name_near = name_hits(&input, index);

    if let Some(record) = phone_exact.iter().find(|hit| hit.name_distance == Some(0)) {
        return ClassificationDto {
            decision: Decision::ExactSame {
                record: record.clone(),
            },
            matches: phone_exact,
            near: name_near,
        };
    }

    if let Some(min_name_distance) = phone_exact.iter().filter_map(|hit| hit.name_distance).min() {
        let reason = if min_name_distance > 0 {
            DecisionReason::PhoneExactNameDiff
        } else {
            DecisionReason::PhoneExact
        };
        return ClassificationDto {
            decision: Decision::WarnConfirm { reason },
            matches: phone_exact,
            near: name_near,
        };
    }

    if !phone_near.is_empty() {
        return ClassificationDto {
            decision: Decision::WarnConfirm {
                reason: DecisionReason::PhoneNear,
            },
            matches: phone_near,
            near: name_near,
        };
    }

    if !name_near.is_empty() {
        return ClassificationDto {
            decision: Decision::WarnConfirm {
                reason: DecisionReason::NameNear,
            },
            matches: Vec::new(),
            near: name_near,
        };
    }

    ClassificationDto {
        decision: Decision::Ok {
            reason: DecisionReason::Clear,
        },
        matches: Vec::new(),
        near: Vec::new(),
    }
}

/// Exact and one-edit-away phone hits, in source order.
fn phone_hits(
    input: &NormalizedCandidate,
    index: &RecordIndex,
) -> (Vec<PhoneMatchDto>, Vec<PhoneMatchDto>) {
    if !input.has_phone() {
        return (Vec::new(), Vec::new());
    }

    index
        .iter()
        .flat_map(|record| record.phones.iter().map(move |phone| (record, phone)))
        .filter_map(|(record, phone)| {
            let distance = phone_distance(&input.phone, phone);
            let name_distance = match distance {
                PHONE_EXACT => Some(edit_distance(&input.full, &record.norm_name)),
                PHONE_NEAR => None,
                _ => return None,
            };
            Some(PhoneMatchDto {
                id: record.id.clone(),
                full_name: record.full_name.clone(),
                phone: phone.clone(),
                distance,
                name_distance,
            })
        })
        .partition(|hit| hit.distance == PHONE_EXACT)
}

/// Records whose first and last names both fuzzy-match the candidate's.
fn name_hits(input: &NormalizedCandidate, index: &RecordIndex) -> Vec<NameMatchDto> {
    if input.first.is_empty() || input.last.is_empty() {
        return Vec::new();
    }

    let mut hits: Vec<NameMatchDto> = index
        .iter()
        .filter_map(|record| {
            let score = FuzzyScore::combine(
                fuzzy_score(&input.first, &record.norm_first),
                fuzzy_score(&input.last, &record.norm_last),
            );
            score
                .is_match()
                .then(|| NameMatchDto::from_record(record, score, index))
        })
        .collect();
    hits.sort_by(|a, b| a.score().rank_cmp(&b.score()));
    hits
}

#[cfg(test)]
mod tests {
    use super::classify;
    use crate::domain::{Candidate, PipelineRow, RecordIndex};
    use crate::dto::{Decision, DecisionReason};
    use crate::rules::distance::MatchKind;

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
    fn exact_same_wins_over_other_signals() {
        let index = index(&[
            ("1", "Marco", "Bianchi", "3331234567"),
            ("2", "Maria", "Rossi", "3331234567"),
            ("3", "Maria", "Rossi", "3331234568"),
        ]);
        let result = classify(&Candidate::new("Maria", "Rossi", "3331234567"), &index);
        match &result.decision {
            Decision::ExactSame { record } => assert_eq!(record.id, "2"),
            other => panic!("unexpected decision {other:?}"),
        }
        assert_eq!(result.matches.len(), 2);
        assert_eq!(result.near.len(), 2);
    }

    #[test]
    fn first_exact_same_record_is_kept() {
        let index = index(&[
            ("1", "Maria", "Rossi", "3331234567"),
            ("1_01", "Maria", "Rossi", "3331234567"),
        ]);
        let result = classify(&Candidate::new("Maria", "Rossi", "+39 333 1234567"), &index);
        match &result.decision {
            Decision::ExactSame { record } => assert_eq!(record.id, "1"),
            other => panic!("unexpected decision {other:?}"),
        }
    }

    #[test]
    fn phone_exact_with_other_name_warns() {
        let index = index(&[("1", "Marco", "Bianchi", "3331234567")]);
        let result = classify(&Candidate::new("Maria", "Rossi", "3331234567"), &index);
        assert_eq!(
            result.decision,
            Decision::WarnConfirm {
                reason: DecisionReason::PhoneExactNameDiff
            }
        );
        assert_eq!(result.matches[0].name_distance, Some(7));
    }

    #[test]
    fn phone_exact_suppresses_phone_near() {
        let index = index(&[
            ("1", "Luca", "Neri", "3331234568"),
            ("2", "Marco", "Bianchi", "3331234567"),
        ]);
        let result = classify(&Candidate::new("Maria", "Rossi", "3331234567"), &index);
        assert_eq!(
            result.decision.reason(),
            Some(DecisionReason::PhoneExactNameDiff)
        );
        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].id, "2");
    }

    #[test]
    fn phone_near_reports_near_hits() {
        let index = index(&[("1", "Luca", "Neri", "3331234567 / 3331234566")]);
        let result = classify(&Candidate::new("Maria", "Rossi", "3331234568"), &index);
        assert_eq!(result.decision.reason(), Some(DecisionReason::PhoneNear));
        assert_eq!(result.matches.len(), 2);
        assert!(result.matches.iter().all(|hit| hit.distance == 1));
        assert!(result.near.is_empty());
    }

    #[test]
    fn name_near_requires_both_parts() {
        let index = index(&[
            ("1", "Giulia", "Rossi", "0611111111"),
            ("2", "Paolo", "Rossi", "0622222222"),
            ("3", "Marja", "Rossi", "0633333333"),
        ]);
        let result = classify(&Candidate::new("Maria", "Rossi", "3330000000"), &index);
        assert_eq!(result.decision.reason(), Some(DecisionReason::NameNear));
        assert!(result.matches.is_empty());
        assert_eq!(result.near.len(), 1);
        assert_eq!(result.near[0].id, "3");
        assert_eq!(result.near[0].kind, MatchKind::Similar);
    }

    #[test]
    fn surname_only_match_is_clear() {
        let index = index(&[
            ("1", "Giulia", "Rossi", ""),
            ("2", "Paolo", "Rossi", ""),
            ("3", "Francesco", "Rossi", ""),
        ]);
        let result = classify(&Candidate::new("Maria", "Rossi", ""), &index);
        assert_eq!(
            result.decision,
            Decision::Ok {
                reason: DecisionReason::Clear
            }
        );
    }

    #[test]
    fn name_near_is_ranked_by_kind_then_distance() {
        let index = index(&[
            ("1", "Mariangela", "Rossini", ""),
            ("2", "Maria", "Rosi", ""),
            ("3", "Maria", "Rossi", ""),
        ]);
        let result = classify(&Candidate::new("Maria", "Rossi", ""), &index);
        let ids: Vec<&str> = result.near.iter().map(|hit| hit.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "1", "2"]);
        assert_eq!(result.near[1].kind, MatchKind::Prefix);
    }

    #[test]
    fn empty_candidate_is_clear() {
        let index = index(&[("1", "Maria", "Rossi", "3331234567")]);
        let result = classify(&Candidate::default(), &index);
        assert_eq!(result.decision.label(), "OK");
        assert!(result.matches.is_empty());
        assert!(result.near.is_empty());
    }
}
