use std::path::Path;

use super::*;

#[test]
fn default_policy_is_valid() {
    assert!(validate_policy(&MatchPolicy::default()).is_ok());
}

#[test]
fn default_weights_favor_reference() {
    let weights = FusionWeights::default();
    assert!((weights.reference - 0.7).abs() < f64::EPSILON);
    assert!((weights.name - 0.3).abs() < f64::EPSILON);
}

#[test]
fn empty_document_uses_defaults() {
    let policy = parse_policy("{}").expect("empty mapping should parse");
    assert_eq!(policy, MatchPolicy::default());
}

#[test]
fn partial_document_overrides_only_given_keys() {
    let policy = parse_policy("top_n: 10\nmin_confidence: 0.75\n").unwrap();
    assert_eq!(policy.top_n, 10);
    assert!((policy.min_confidence - 0.75).abs() < f64::EPSILON);
    assert!((policy.duplicate_threshold - 0.90).abs() < f64::EPSILON);
}

#[test]
fn validate_rejects_percentage_scale_threshold() {
    let err = parse_policy("duplicate_threshold: 85\n").unwrap_err();
    assert!(err.to_string().contains("duplicate_threshold"));
}

#[test]
fn validate_rejects_weights_not_summing_to_one() {
    let err = parse_policy("weights:\n  reference: 0.6\n  name: 0.6\n").unwrap_err();
    assert!(err.to_string().contains("sum to 1"));
}

#[test]
fn validate_rejects_negative_weight() {
    let err = parse_policy("weights:\n  reference: 1.2\n  name: -0.2\n").unwrap_err();
    assert!(err.to_string().contains("reference weight"));
}

#[test]
fn validate_rejects_negative_price_threshold() {
    let err = parse_policy("price_difference_threshold: -1\n").unwrap_err();
    assert!(err.to_string().contains("non-negative"));
}

#[test]
fn validate_rejects_zero_parallel_threshold() {
    let err = parse_policy("parallel_threshold: 0\n").unwrap_err();
    assert!(err.to_string().contains("parallel_threshold"));
}

#[test]
fn malformed_yaml_is_a_parse_error() {
    let err = parse_policy("top_n: [oops").unwrap_err();
    assert!(matches!(err, ConfigError::PolicyFileParse(_)));
}

#[test]
fn load_policy_missing_file_is_io_error() {
    let err = load_policy(Path::new("/definitely/not/here.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::PolicyFileIo { .. }));
}

#[test]
fn load_policy_from_real_file() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("config")
        .join("match_policy.yaml");
    assert!(
        path.exists(),
        "match_policy.yaml missing at {path:?}; required for this test"
    );
    let policy = load_policy(&path).expect("failed to load match_policy.yaml");
    assert_eq!(policy, MatchPolicy::default());
}
