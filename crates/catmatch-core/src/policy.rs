//! Matching policy: fusion weights and the thresholds every operation
//! defaults to when a caller does not supply its own.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Weights applied when both a reference score and a name score are present.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionWeights {
    pub reference: f64,
    pub name: f64,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            reference: 0.7,
            name: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchPolicy {
    pub weights: FusionWeights,
    /// Minimum fused score for a best-match result, on the `[0,1]` scale.
    pub min_confidence: f64,
    pub top_n: usize,
    pub duplicate_threshold: f64,
    pub anomaly_similarity_threshold: f64,
    /// Percentage (not fraction) price gap above which a matched pair is flagged.
    pub price_difference_threshold: f64,
    /// Candidate-set size from which scoring fans out across threads.
    pub parallel_threshold: usize,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            weights: FusionWeights::default(),
            min_confidence: 0.80,
            top_n: 3,
            duplicate_threshold: 0.90,
            anomaly_similarity_threshold: 0.90,
            price_difference_threshold: 10.0,
            parallel_threshold: 512,
        }
    }
}

/// Load and validate the matching policy from a YAML file.
///
/// Missing keys fall back to [`MatchPolicy::default`].
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_policy(path: &Path) -> Result<MatchPolicy, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::PolicyFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_policy(&content)
}

/// Parse and validate a policy document.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_policy(content: &str) -> Result<MatchPolicy, ConfigError> {
    let policy: MatchPolicy =
        serde_yaml::from_str(content).map_err(ConfigError::PolicyFileParse)?;
    validate_policy(&policy)?;
    Ok(policy)
}

fn validate_policy(policy: &MatchPolicy) -> Result<(), ConfigError> {
    let FusionWeights { reference, name } = policy.weights;
    for (label, weight) in [("reference", reference), ("name", name)] {
        if !(0.0..=1.0).contains(&weight) {
            return Err(ConfigError::Validation(format!(
                "{label} weight {weight} must be within [0, 1]"
            )));
        }
    }
    if ((reference + name) - 1.0).abs() > 1e-9 {
        return Err(ConfigError::Validation(format!(
            "weights must sum to 1, got {}",
            reference + name
        )));
    }

    for (label, value) in [
        ("min_confidence", policy.min_confidence),
        ("duplicate_threshold", policy.duplicate_threshold),
        (
            "anomaly_similarity_threshold",
            policy.anomaly_similarity_threshold,
        ),
    ] {
        if !(0.0..=1.0).contains(&value) {
            return Err(ConfigError::Validation(format!(
                "{label} {value} must be a fraction within [0, 1]"
            )));
        }
    }

    if !policy.price_difference_threshold.is_finite() || policy.price_difference_threshold < 0.0
    {
        return Err(ConfigError::Validation(format!(
            "price_difference_threshold {} must be a non-negative percentage",
            policy.price_difference_threshold
        )));
    }

    if policy.parallel_threshold == 0 {
        return Err(ConfigError::Validation(
            "parallel_threshold must be at least 1".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[path = "policy_test.rs"]
mod tests;
