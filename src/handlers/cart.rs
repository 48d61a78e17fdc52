use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, instrument};

use crate::models::{
    CartError, CartOperation, CartView, FailureSource, ProductId, UpdateAmountRequest,
};
use super::ServiceInfo;
use crate::observability::Metrics;
use crate::services::CartManager;

/// State for cart handlers.
///
/// The manager sits behind an async mutex so that mutations from concurrent
/// requests apply one after the other.
#[derive(Clone)]
pub struct CartState {
    pub manager: Arc<Mutex<CartManager>>,
    pub metrics: Arc<Metrics>,
    pub service: ServiceInfo,
}

impl CartState {
    pub fn new(manager: CartManager, metrics: Arc<Metrics>, service: ServiceInfo) -> Self {
        metrics.set_cart_line_items(manager.cart_size());
        Self {
            manager: Arc::new(Mutex::new(manager)),
            metrics,
            service,
        }
    }
}

type HandlerResult = Result<Json<CartView>, (StatusCode, Json<Value>)>;

/// Get the current cart
#[instrument(skip(state))]
pub async fn get_cart(State(state): State<CartState>) -> Json<CartView> {
    let manager = state.manager.lock().await;
    Json(manager.cart().view())
}

/// Add one unit of a product
#[instrument(skip(state))]
pub async fn add_cart_item(
    State(state): State<CartState>,
    Path(product_id): Path<ProductId>,
) -> HandlerResult {
    let mut manager = state.manager.lock().await;
    let result = manager.add(product_id).await;
    finish(&state, &manager, CartOperation::Add, result)
}

/// Remove a product
#[instrument(skip(state))]
pub async fn remove_cart_item(
    State(state): State<CartState>,
    Path(product_id): Path<ProductId>,
) -> HandlerResult {
    let mut manager = state.manager.lock().await;
    let result = manager.remove(product_id).await;
    finish(&state, &manager, CartOperation::Remove, result)
}

/// Set the amount of a product already in the cart
#[instrument(skip(state, request), fields(amount = request.amount))]
pub async fn update_cart_item(
    State(state): State<CartState>,
    Path(product_id): Path<ProductId>,
    Json(request): Json<UpdateAmountRequest>,
) -> HandlerResult {
    let mut manager = state.manager.lock().await;
    let result = manager.update_amount(product_id, request.amount).await;
    finish(&state, &manager, CartOperation::UpdateAmount, result)
}

/// Record the outcome and turn it into a response
fn finish<T>(
    state: &CartState,
    manager: &CartManager,
    operation: CartOperation,
    result: Result<T, CartError>,
) -> HandlerResult {
    state.metrics.record_cart_operation(operation, &result);
    state.metrics.set_cart_line_items(manager.cart_size());

    match result {
        Ok(_) => {
            info!(operation = %operation, cart_size = manager.cart_size(), "Cart updated");
            Ok(Json(manager.cart().view()))
        }
        Err(err) => Err(cart_error_to_response(err)),
    }
}

/// Convert a cart error to the notice response shown by the page
pub fn cart_error_to_response(err: CartError) -> (StatusCode, Json<Value>) {
    let status = match &err {
        CartError::StockExceeded { .. } => StatusCode::CONFLICT,
        CartError::ProductNotFound { .. } | CartError::NotInCart { .. } => StatusCode::NOT_FOUND,
        CartError::Failed { source, .. } => match source {
            FailureSource::Api(_) => StatusCode::BAD_GATEWAY,
            FailureSource::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        },
    };

    (
        status,
        Json(json!({
            "notice": err.notice(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{StorageError, StorefrontApiError};

    #[test]
    fn test_error_status_mapping() {
        let (status, body) = cart_error_to_response(CartError::StockExceeded {
            product_id: 1,
            requested: 3,
            available: 2,
        });
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body.0["notice"]["message"], "Requested quantity exceeds stock");
        assert_eq!(body.0["notice"]["level"], "error");

        let (status, _) = cart_error_to_response(CartError::NotInCart { product_id: 1 });
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = cart_error_to_response(CartError::failed(
            CartOperation::Add,
            StorefrontApiError::Parse("bad body".to_string()),
        ));
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body.0["notice"]["message"], "Error adding product");

        let (status, _) = cart_error_to_response(CartError::failed(
            CartOperation::UpdateAmount,
            StorageError::Io {
                key: "cart".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
            },
        ));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
