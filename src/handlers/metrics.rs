use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{debug, error, instrument};

use super::CartState;

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Prometheus scrape endpoint.
///
/// The cart size gauge is refreshed from the manager before encoding. A
/// scrape that races a running cart operation keeps the last recorded value.
#[instrument(name = "metrics_handler", skip(state))]
pub async fn metrics_handler(State(state): State<CartState>) -> Response {
    match state.manager.try_lock() {
        Ok(manager) => state.metrics.set_cart_line_items(manager.cart_size()),
        Err(_) => debug!("Cart busy, keeping last cart_line_items value"),
    }

    match state.metrics.encode() {
        Ok(metrics_text) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)],
            metrics_text,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to encode metrics",
            )
                .into_response()
        }
    }
}
