use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use std::{sync::Arc, time::Instant};
use tracing::{field, info, instrument, warn, Span};
use uuid::Uuid;

use super::Metrics;

/// Middleware for request tracing and HTTP metrics
#[instrument(skip_all, fields(
    request_id = %Uuid::new_v4(),
    method = %request.method(),
    uri = %request.uri(),
    endpoint = field::Empty,
))]
pub async fn observability_middleware(
    metrics: Arc<Metrics>,
    request: Request,
    next: Next,
) -> Response {
    let start_time = Instant::now();
    let method = request.method().to_string();

    // Group by route template so product ids don't explode label cardinality
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched_path| matched_path.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    Span::current().record("endpoint", endpoint.as_str());

    let response = next.run(request).await;

    let duration = start_time.elapsed();
    let status_code = response.status().as_u16();

    metrics.record_http_request(&method, &endpoint, status_code, duration.as_secs_f64());

    if status_code >= 500 {
        warn!(
            status_code = status_code,
            duration_ms = duration.as_millis() as u64,
            "Request failed"
        );
    } else {
        info!(
            status_code = status_code,
            duration_ms = duration.as_millis() as u64,
            "Request completed"
        );
    }

    response
}
