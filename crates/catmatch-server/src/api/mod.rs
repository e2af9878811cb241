mod anomalies;
mod duplicates;
mod matches;
mod references;
mod stats;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use catmatch_core::MatchPolicy;
use catmatch_engine::{EngineError, Scoring};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{enforce_rate_limit, request_id, RateLimitState, RequestId};

/// Largest `top_n`/`limit` any endpoint will honour.
const MAX_RESULTS: usize = 200;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub policy: Arc<MatchPolicy>,
}

impl AppState {
    fn scoring(&self) -> Scoring {
        Scoring::from(self.policy.as_ref())
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    fn new(request_id: String, data: T) -> Self {
        Self {
            data,
            meta: ResponseMeta::new(request_id),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "validation_error" => StatusCode::BAD_REQUEST,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "upstream_unavailable" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

/// Clamp a caller-supplied result count; negatives become 0.
pub(super) fn normalize_count(value: Option<i64>, default: usize) -> usize {
    match value {
        None => default.min(MAX_RESULTS),
        Some(n) => usize::try_from(n.max(0)).unwrap_or(0).min(MAX_RESULTS),
    }
}

pub(super) fn map_db_error(request_id: String, error: &catmatch_db::DbError) -> ApiError {
    tracing::error!(error = %error, "catalog query failed");
    ApiError::new(
        request_id,
        "upstream_unavailable",
        "catalog store unavailable",
    )
}

pub(super) fn map_engine_error(request_id: String, error: &EngineError) -> ApiError {
    match error {
        EngineError::InvalidInput(message) => {
            ApiError::new(request_id, "validation_error", message.clone())
        }
    }
}

/// Run a catalog scan on the blocking pool so it cannot stall the async
/// workers serving other requests.
pub(super) async fn run_engine<T, F>(request_id: &str, scan: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, EngineError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(scan)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "catalog scan task failed");
            ApiError::new(request_id, "internal_error", "catalog scan failed")
        })?
        .map_err(|e| map_engine_error(request_id.to_string(), &e))
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-request-id"),
        ])
}

fn catalog_router(rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/matches/best", get(matches::best_matches))
        .route("/api/v1/matches/top", get(matches::top_matches))
        .route("/api/v1/duplicates", get(duplicates::list_duplicates))
        .route(
            "/api/v1/price-anomalies",
            get(anomalies::list_price_anomalies),
        )
        .route("/api/v1/references", get(references::search_references))
        .route("/api/v1/stats", get(stats::dashboard_stats))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        ))
}

pub fn build_app(state: AppState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(catalog_router(rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    match catmatch_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        database: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}

#[cfg(test)]
mod tests;
