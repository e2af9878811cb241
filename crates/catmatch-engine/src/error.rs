use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Reject similarity thresholds that are not fractions in `[0, 1]`.
///
/// # Errors
///
/// Returns [`EngineError::InvalidInput`] naming `label` when `value` is out of range.
pub fn check_fraction(label: &str, value: f64) -> Result<f64, EngineError> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(EngineError::InvalidInput(format!(
            "{label} must be within [0, 1], got {value}"
        )))
    }
}

/// Reject negative or non-finite percentage thresholds.
///
/// # Errors
///
/// Returns [`EngineError::InvalidInput`] naming `label` when `value` is invalid.
pub fn check_percentage(label: &str, value: f64) -> Result<f64, EngineError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(EngineError::InvalidInput(format!(
            "{label} must be a non-negative percentage, got {value}"
        )))
    }
}
