use axum::{
    extract::{Query, State},
    Extension, Json,
};
use catmatch_core::DuplicateGroup;
use catmatch_engine::check_fraction;
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{map_db_error, map_engine_error, run_engine, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct DuplicateQuery {
    pub threshold: Option<f64>,
}

pub(super) async fn list_duplicates(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<DuplicateQuery>,
) -> Result<Json<ApiResponse<Vec<DuplicateGroup>>>, ApiError> {
    let threshold = query.threshold.unwrap_or(state.policy.duplicate_threshold);
    check_fraction("threshold", threshold).map_err(|e| map_engine_error(req_id.0.clone(), &e))?;

    let entries = catmatch_db::list_entries(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    let scoring = state.scoring();
    let data = run_engine(&req_id.0, move || {
        catmatch_engine::find_duplicates(&entries, threshold, &scoring)
    })
    .await?;

    Ok(Json(ApiResponse::new(req_id.0, data)))
}
