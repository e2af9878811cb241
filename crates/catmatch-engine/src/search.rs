use catmatch_core::{CatalogEntry, ProductRecord, Vendor};

use crate::error::EngineError;

/// The trimmed search term.
///
/// # Errors
///
/// Returns [`EngineError::InvalidInput`] when `query` is empty or whitespace.
pub fn check_query(query: &str) -> Result<&str, EngineError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidInput(
            "query must not be empty".to_string(),
        ));
    }
    Ok(trimmed)
}

/// Vendor records whose reference contains `query`, ignoring case.
///
/// Within an entry the A side comes before the B side; entry order is kept.
///
/// # Errors
///
/// Returns [`EngineError::InvalidInput`] when `query` is empty or whitespace.
pub fn search_by_reference(
    entries: &[CatalogEntry],
    query: &str,
) -> Result<Vec<ProductRecord>, EngineError> {
    let needle = check_query(query)?.to_lowercase();

    Ok(entries
        .iter()
        .flat_map(|entry| Vendor::ALL.into_iter().filter_map(move |v| entry.record(v)))
        .filter(|record| {
            record
                .reference
                .as_deref()
                .is_some_and(|r| r.to_lowercase().contains(&needle))
        })
        .collect())
}
