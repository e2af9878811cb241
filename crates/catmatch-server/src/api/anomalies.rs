use axum::{
    extract::{Query, State},
    Extension, Json,
};
use catmatch_core::PriceAnomaly;
use catmatch_engine::{check_fraction, check_percentage};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{map_db_error, map_engine_error, run_engine, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct AnomalyQuery {
    pub similarity_threshold: Option<f64>,
    /// Percentage, e.g. `10` for 10%.
    pub price_threshold: Option<f64>,
}

pub(super) async fn list_price_anomalies(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<AnomalyQuery>,
) -> Result<Json<ApiResponse<Vec<PriceAnomaly>>>, ApiError> {
    let similarity_threshold = query
        .similarity_threshold
        .unwrap_or(state.policy.anomaly_similarity_threshold);
    let price_threshold = query
        .price_threshold
        .unwrap_or(state.policy.price_difference_threshold);

    check_fraction("similarity_threshold", similarity_threshold)
        .and_then(|_| check_percentage("price_threshold", price_threshold))
        .map_err(|e| map_engine_error(req_id.0.clone(), &e))?;

    let entries = catmatch_db::list_entries(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    let scoring = state.scoring();
    let data = run_engine(&req_id.0, move || {
        catmatch_engine::find_price_anomalies(
            &entries,
            similarity_threshold,
            price_threshold,
            &scoring,
        )
    })
    .await?;

    Ok(Json(ApiResponse::new(req_id.0, data)))
}
