use axum::{
    extract::{Query, State},
    Extension, Json,
};
use catmatch_core::ProductRecord;
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{map_db_error, map_engine_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct ReferenceQuery {
    #[serde(default)]
    pub query: String,
}

pub(super) async fn search_references(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<ReferenceQuery>,
) -> Result<Json<ApiResponse<Vec<ProductRecord>>>, ApiError> {
    let term = catmatch_engine::check_query(&params.query)
        .map_err(|e| map_engine_error(req_id.0.clone(), &e))?;

    let entries = catmatch_db::search_entries(&state.pool, term)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    let data = catmatch_engine::search_by_reference(&entries, term)
        .map_err(|e| map_engine_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(req_id.0, data)))
}
