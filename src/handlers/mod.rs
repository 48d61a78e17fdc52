pub mod cart;
pub mod health;
pub mod metrics;

pub use cart::*;
pub use health::*;
pub use metrics::*;

use axum::{
    extract::Request,
    middleware::{self, Next},
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::observability::observability_middleware;

/// Build the application router
pub fn create_router(state: CartState) -> Router {
    let metrics_for_middleware = state.metrics.clone();

    Router::new()
        .route("/health/status", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/api/cart", get(get_cart))
        .route(
            "/api/cart/items/:product_id",
            post(add_cart_item)
                .put(update_cart_item)
                .delete(remove_cart_item),
        )
        .with_state(state)
        .route_layer(middleware::from_fn(move |req: Request, next: Next| {
            observability_middleware(metrics_for_middleware.clone(), req, next)
        }))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}
