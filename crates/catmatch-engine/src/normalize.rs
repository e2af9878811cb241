/// Canonical form used for every reference and name comparison.
///
/// Lowercases, then keeps only alphanumeric characters, which also drops all
/// whitespace and punctuation. Idempotent.
#[must_use]
pub fn normalize(s: &str) -> String {
    s.chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_alphanumeric())
        .collect()
}

/// [`normalize`] for an optional field; absent input yields an empty string.
#[must_use]
pub fn normalize_opt(s: Option<&str>) -> String {
    s.map(normalize).unwrap_or_default()
}
