use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use catmatch_engine::MatchSummary;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::middleware::RequestId;

use super::{map_db_error, run_engine, ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub(super) struct VendorStatsItem {
    vendor: String,
    total_products: i64,
    brand_count: i64,
    category_count: i64,
    avg_price: Option<Decimal>,
}

#[derive(Debug, Serialize)]
pub(super) struct DashboardStats {
    summary: MatchSummary,
    vendors: Vec<VendorStatsItem>,
}

pub(super) async fn dashboard_stats(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<DashboardStats>>, ApiError> {
    let (entries, vendor_rows) = tokio::try_join!(
        catmatch_db::list_entries(&state.pool),
        catmatch_db::vendor_stats(&state.pool),
    )
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let scoring = state.scoring();
    let policy = Arc::clone(&state.policy);
    let summary = run_engine(&req_id.0, move || {
        catmatch_engine::summarize(
            &entries,
            policy.duplicate_threshold,
            policy.price_difference_threshold,
            &scoring,
        )
    })
    .await?;

    let vendors = vendor_rows
        .into_iter()
        .map(|row| VendorStatsItem {
            vendor: row.vendor,
            total_products: row.total_products,
            brand_count: row.brand_count,
            category_count: row.category_count,
            avg_price: row.avg_price,
        })
        .collect();

    Ok(Json(ApiResponse::new(
        req_id.0,
        DashboardStats { summary, vendors },
    )))
}
