//! Per-vendor catalog statistics.

use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::DbError;

/// Aggregate figures for one vendor's side of the catalog.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VendorStatsRow {
    pub vendor: String,
    /// Entries carrying this vendor's reference.
    pub total_products: i64,
    pub brand_count: i64,
    pub category_count: i64,
    /// `None` when none of the vendor's rows has a price.
    pub avg_price: Option<Decimal>,
}

/// Returns one stats row per vendor, `tunisianet` first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn vendor_stats(pool: &PgPool) -> Result<Vec<VendorStatsRow>, DbError> {
    let rows = sqlx::query_as::<_, VendorStatsRow>(
        "SELECT vendor, total_products, brand_count, category_count, avg_price FROM ( \
         SELECT 'tunisianet' AS vendor, \
                COUNT(*) AS total_products, \
                COUNT(DISTINCT brand) AS brand_count, \
                COUNT(DISTINCT category) AS category_count, \
                AVG(tunisianet_price) AS avg_price \
         FROM catalog_entries \
         WHERE NULLIF(BTRIM(tunisianet_reference), '') IS NOT NULL \
         UNION ALL \
         SELECT 'mytek', \
                COUNT(*), \
                COUNT(DISTINCT brand), \
                COUNT(DISTINCT category), \
                AVG(mytek_price) \
         FROM catalog_entries \
         WHERE NULLIF(BTRIM(mytek_reference), '') IS NOT NULL \
         ) stats \
         ORDER BY vendor = 'mytek', vendor",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
