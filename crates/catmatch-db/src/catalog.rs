//! Database operations for the `catalog_entries` table.

use catmatch_core::{CatalogEntry, EntryScores};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `catalog_entries` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CatalogEntryRow {
    pub id: i64,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub tunisianet_reference: Option<String>,
    pub tunisianet_name: Option<String>,
    pub tunisianet_price: Option<Decimal>,
    pub mytek_reference: Option<String>,
    pub mytek_name: Option<String>,
    pub mytek_price: Option<Decimal>,
    pub reference_similarity: Option<f64>,
    pub name_similarity: Option<f64>,
    pub average_similarity: Option<f64>,
    pub price_difference: Option<Decimal>,
    pub updated_at: DateTime<Utc>,
}

impl From<CatalogEntryRow> for CatalogEntry {
    fn from(row: CatalogEntryRow) -> Self {
        Self {
            id: row.id,
            brand: row.brand,
            category: row.category,
            tunisianet_reference: row.tunisianet_reference,
            tunisianet_name: row.tunisianet_name,
            tunisianet_price: row.tunisianet_price,
            mytek_reference: row.mytek_reference,
            mytek_name: row.mytek_name,
            mytek_price: row.mytek_price,
            reference_similarity: row.reference_similarity,
            name_similarity: row.name_similarity,
            average_similarity: row.average_similarity,
            price_difference: row.price_difference,
        }
    }
}

const ENTRY_COLUMNS: &str = "id, brand, category, \
     tunisianet_reference, tunisianet_name, tunisianet_price, \
     mytek_reference, mytek_name, mytek_price, \
     reference_similarity, name_similarity, average_similarity, price_difference, \
     updated_at";

async fn fetch_entries(
    pool: &PgPool,
    filter: &str,
    pattern: Option<&str>,
) -> Result<Vec<CatalogEntry>, DbError> {
    let sql = format!("SELECT {ENTRY_COLUMNS} FROM catalog_entries {filter} ORDER BY id");
    let mut query = sqlx::query_as::<_, CatalogEntryRow>(&sql);
    if let Some(pattern) = pattern {
        query = query.bind(pattern);
    }
    let rows = query.fetch_all(pool).await?;

    Ok(rows.into_iter().map(CatalogEntry::from).collect())
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns every catalog entry, ordered by id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_entries(pool: &PgPool) -> Result<Vec<CatalogEntry>, DbError> {
    fetch_entries(pool, "", None).await
}

/// Returns entries whose B side carries a name: the candidate pool for
/// best-match lookups.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_candidate_entries(pool: &PgPool) -> Result<Vec<CatalogEntry>, DbError> {
    fetch_entries(pool, "WHERE NULLIF(BTRIM(mytek_name), '') IS NOT NULL", None).await
}

/// Returns entries where either vendor's reference contains `query`,
/// case-insensitively. `%` and `_` in `query` match literally.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn search_entries(pool: &PgPool, query: &str) -> Result<Vec<CatalogEntry>, DbError> {
    let pattern = contains_pattern(query.trim());
    fetch_entries(
        pool,
        "WHERE tunisianet_reference ILIKE $1 OR mytek_reference ILIKE $1",
        Some(&pattern),
    )
    .await
}

/// Returns entries with at least one empty score-cache column.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_entries_needing_rescore(pool: &PgPool) -> Result<Vec<CatalogEntry>, DbError> {
    fetch_entries(
        pool,
        "WHERE reference_similarity IS NULL \
            OR name_similarity IS NULL \
            OR average_similarity IS NULL \
            OR (price_difference IS NULL \
                AND tunisianet_price IS NOT NULL \
                AND mytek_price IS NOT NULL)",
        None,
    )
    .await
}

/// Writes freshly computed scores back to their entries.
///
/// Returns the number of rows updated. All updates run inside a single
/// transaction; if any fails the batch is rolled back.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any update fails.
pub async fn update_entry_scores(pool: &PgPool, scores: &[EntryScores]) -> Result<u64, DbError> {
    let mut tx = pool.begin().await?;
    let mut updated = 0u64;

    for score in scores {
        let result = sqlx::query(
            "UPDATE catalog_entries SET \
                 reference_similarity = $2, \
                 name_similarity = $3, \
                 average_similarity = $4, \
                 price_difference = $5, \
                 updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(score.id)
        .bind(score.reference_similarity)
        .bind(score.name_similarity)
        .bind(score.average_similarity)
        .bind(score.price_difference)
        .execute(&mut *tx)
        .await?;

        updated += result.rows_affected();
    }

    tx.commit().await?;
    tracing::debug!(updated, "score cache written");
    Ok(updated)
}

/// `ILIKE` pattern matching any value that contains `query`.
fn contains_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
