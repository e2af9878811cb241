use catmatch_core::{FusionWeights, ProductRecord, Vendor};

use super::*;

fn source(reference: &str, name: &str) -> ProductRecord {
    let mut record = ProductRecord::new(0, Vendor::Tunisianet);
    if !reference.is_empty() {
        record = record.with_reference(reference);
    }
    if !name.is_empty() {
        record = record.with_name(name);
    }
    record
}

fn candidate(id: i64, reference: &str, name: &str) -> ProductRecord {
    ProductRecord {
        entry_id: id,
        vendor: Vendor::Mytek,
        ..source(reference, name)
    }
}

#[test]
fn empty_candidates_yield_empty_result() {
    let ranked = rank_matches(&source("ABC123", ""), &[], 3, 0.8, &Scoring::default())
        .expect("rank");
    assert!(ranked.is_empty());
}

#[test]
fn blank_source_is_invalid_input() {
    let err = rank_matches(
        &source("  ", ""),
        &[candidate(1, "ABC", "")],
        3,
        0.8,
        &Scoring::default(),
    )
    .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}

#[test]
fn percentage_scale_confidence_is_rejected() {
    let err = rank_matches(
        &source("ABC", ""),
        &[candidate(1, "ABC", "")],
        3,
        80.0,
        &Scoring::default(),
    )
    .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}

#[test]
fn zero_top_n_yields_empty_result() {
    let ranked = rank_matches(
        &source("ABC", ""),
        &[candidate(1, "ABC", "")],
        0,
        0.0,
        &Scoring::default(),
    )
    .expect("rank");
    assert!(ranked.is_empty());
}

#[test]
fn results_are_bounded_filtered_and_descending() {
    let candidates = vec![
        candidate(1, "REF1000", ""),   // 6/7
        candidate(2, "XYZ", ""),       // 0
        candidate(3, "REF100", ""),    // 1.0
        candidate(4, "REF10", ""),     // 5/6
        candidate(5, "REF100000", ""), // 6/9
    ];
    let ranked = rank_matches(
        &source("ref-100", ""),
        &candidates,
        2,
        0.8,
        &Scoring::default(),
    )
    .expect("rank");

    let ids: Vec<i64> = ranked.iter().map(|m| m.candidate.entry_id).collect();
    assert_eq!(ids, vec![3, 1]);
    assert!(ranked.iter().all(|m| m.average_similarity >= 0.8));
    assert!(ranked
        .windows(2)
        .all(|w| w[0].average_similarity >= w[1].average_similarity));
}

#[test]
fn equal_reference_scores_keep_first_seen() {
    let candidates = vec![
        candidate(10, "ABC123", "first"),
        candidate(11, "abc-123", "second"),
    ];
    let ranked = rank_matches(
        &source("ABC123", ""),
        &candidates,
        3,
        0.8,
        &Scoring::default(),
    )
    .expect("rank");
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].candidate.entry_id, 10);
}

#[test]
fn zero_reference_scores_dedupe_by_entry_id() {
    // Name-only source: every reference score is 0, so each entry stands alone.
    let candidates = vec![
        candidate(1, "", "ThinkPad E14"),
        candidate(2, "", "ThinkPad E14"),
        candidate(1, "", "ThinkPad E14"),
    ];
    let ranked = rank_matches(
        &source("", "thinkpad e14"),
        &candidates,
        5,
        0.8,
        &Scoring::default(),
    )
    .expect("rank");
    let ids: Vec<i64> = ranked.iter().map(|m| m.candidate.entry_id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn missing_candidate_field_scores_zero_for_that_field() {
    let scored = score_pair(
        &source("ABC123", "Laptop"),
        &candidate(1, "ABC123", ""),
        FusionWeights::default(),
    );
    assert!((scored.reference_similarity - 1.0).abs() < 1e-12);
    assert!(scored.name_similarity.abs() < 1e-12);
    assert!((scored.average_similarity - 0.7).abs() < 1e-12);
}

#[test]
fn single_present_score_is_the_average() {
    let scored = score_pair(
        &source("", "Galaxy A15"),
        &candidate(1, "SM-A155", "Galaxy A15"),
        FusionWeights::default(),
    );
    assert!(scored.reference_similarity.abs() < 1e-12);
    assert!((scored.average_similarity - 1.0).abs() < 1e-12);
}

#[test]
fn parallel_scoring_matches_sequential_order() {
    let candidates: Vec<ProductRecord> = (0..64)
        .map(|i| candidate(i, &format!("REF{i}"), &format!("Item {i}")))
        .collect();
    let src = source("REF7", "Item 7");

    let sequential = score_candidates(
        &src,
        &candidates,
        &Scoring {
            weights: FusionWeights::default(),
            parallel_threshold: usize::MAX,
        },
    );
    let parallel = score_candidates(
        &src,
        &candidates,
        &Scoring {
            weights: FusionWeights::default(),
            parallel_threshold: 1,
        },
    );
    assert_eq!(sequential, parallel);
}
