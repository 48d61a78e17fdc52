use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};
use tracing::instrument;

use super::CartState;

/// Name and version reported by the health endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
}

impl ServiceInfo {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl FromRef<CartState> for ServiceInfo {
    fn from_ref(state: &CartState) -> Self {
        state.service.clone()
    }
}

/// Health check endpoint handler
#[instrument(name = "health_check", skip(service))]
pub async fn health_check(State(service): State<ServiceInfo>) -> Result<Json<Value>, StatusCode> {
    Ok(Json(json!({
        "status": "healthy",
        "service": service.name,
        "version": service.version,
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_check_reports_configured_service() {
        let service = ServiceInfo::new("cart-eu", "2.3.1");

        let Json(body) = health_check(State(service)).await.unwrap();

        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"], "cart-eu");
        assert_eq!(body["version"], "2.3.1");
    }
}
