use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api::ApiError;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Correlation id of the current request, echoed in every envelope's `meta`.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Request budget for the current window.
#[derive(Debug)]
struct Budget {
    opened_at: Instant,
    spent: usize,
}

impl Budget {
    fn new(now: Instant) -> Self {
        Self {
            opened_at: now,
            spent: 0,
        }
    }

    /// Spend one request if the budget allows it, opening a fresh window
    /// once `window` has elapsed.
    fn try_spend(&mut self, now: Instant, limit: usize, window: Duration) -> bool {
        if now.duration_since(self.opened_at) >= window {
            *self = Self::new(now);
        }
        if self.spent >= limit {
            return false;
        }
        self.spent += 1;
        true
    }
}

/// Process-wide request budget for the catalog routes.
///
/// `/api/v1/health` is mounted outside this limiter so probes keep working
/// while catalog traffic is throttled.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    limit: usize,
    window: Duration,
    budget: Arc<Mutex<Budget>>,
}

impl RateLimitState {
    #[must_use]
    pub fn new(limit: usize, window: Duration) -> Self {
        Self {
            limit,
            window,
            budget: Arc::new(Mutex::new(Budget::new(Instant::now()))),
        }
    }

    async fn admit(&self) -> bool {
        self.budget
            .lock()
            .await
            .try_spend(Instant::now(), self.limit, self.window)
    }
}

/// Tag the request with the caller's `x-request-id`, or a fresh `UUIDv4`,
/// and echo it on the response.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map_or_else(|| Uuid::new_v4().to_string(), ToOwned::to_owned);

    req.extensions_mut().insert(RequestId(id.clone()));
    let mut res = next.run(req).await;

    if let Ok(value) = HeaderValue::from_str(&id) {
        res.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    res
}

/// Reject catalog requests over budget with a `rate_limited` envelope.
pub async fn enforce_rate_limit(
    State(rate_limit): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    if rate_limit.admit().await {
        return next.run(req).await;
    }

    let id = req
        .extensions()
        .get::<RequestId>()
        .map(|r| r.0.clone())
        .unwrap_or_default();
    tracing::warn!(request_id = %id, path = %req.uri().path(), "catalog request over budget");
    ApiError::new(id, "rate_limited", "too many catalog requests; retry later").into_response()
}
