use axum::{
    extract::{Query, State},
    Extension, Json,
};
use catmatch_core::{MatchCandidate, ProductRecord, Vendor};
use catmatch_engine::check_fraction;
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{
    map_db_error, map_engine_error, normalize_count, run_engine, ApiError, ApiResponse, AppState,
};

#[derive(Debug, Deserialize)]
pub(super) struct BestMatchQuery {
    pub reference: Option<String>,
    pub name: Option<String>,
    pub top_n: Option<i64>,
    pub min_confidence: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct TopMatchQuery {
    pub limit: Option<i64>,
}

/// Best B-side candidates for a reference and/or name.
pub(super) async fn best_matches(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<BestMatchQuery>,
) -> Result<Json<ApiResponse<Vec<MatchCandidate>>>, ApiError> {
    let mut source = ProductRecord::new(0, Vendor::Tunisianet);
    source.reference = query.reference;
    source.name = query.name;

    let top_n = normalize_count(query.top_n, state.policy.top_n);
    let min_confidence = query.min_confidence.unwrap_or(state.policy.min_confidence);

    catmatch_engine::check_source(&source)
        .and_then(|()| check_fraction("min_confidence", min_confidence))
        .map_err(|e| map_engine_error(req_id.0.clone(), &e))?;

    let entries = catmatch_db::list_candidate_entries(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    let candidates: Vec<ProductRecord> = entries
        .iter()
        .filter_map(|entry| entry.record(Vendor::Mytek))
        .collect();

    let scoring = state.scoring();
    let data = run_engine(&req_id.0, move || {
        catmatch_engine::rank_matches(&source, &candidates, top_n, min_confidence, &scoring)
    })
    .await?;

    Ok(Json(ApiResponse::new(req_id.0, data)))
}

/// Highest-scoring stored pairs across the catalog.
pub(super) async fn top_matches(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<TopMatchQuery>,
) -> Result<Json<ApiResponse<Vec<MatchCandidate>>>, ApiError> {
    let limit = normalize_count(query.limit, state.policy.top_n);

    let entries = catmatch_db::list_entries(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    let scoring = state.scoring();
    let data = run_engine(&req_id.0, move || {
        Ok(catmatch_engine::top_pairs(&entries, limit, &scoring))
    })
    .await?;

    Ok(Json(ApiResponse::new(req_id.0, data)))
}
