#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::json;
use storefront_cart::repositories::{FilePersistenceSlot, HttpStorefrontApi};
use storefront_cart::CartManager;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const CART_KEY: &str = "@RocketShoes:cart";

/// Mock catalog and stock services plus a private storage directory
pub struct TestEnvironment {
    pub server: MockServer,
    pub storage_dir: PathBuf,
}

impl TestEnvironment {
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        let storage_dir = std::env::temp_dir().join(format!("storefront-cart-it-{}", Uuid::new_v4()));

        Self {
            server,
            storage_dir,
        }
    }

    /// Register a catalog product
    pub async fn with_product(&self, id: u64, title: &str, price: f64) -> &Self {
        let route = format!("/products/{id}");
        self.with_product_under(&route, id, title, price).await
    }

    /// Serve a product body under an arbitrary catalog route
    pub async fn with_product_under(
        &self,
        route: &str,
        id: u64,
        title: &str,
        price: f64,
    ) -> &Self {
        Mock::given(method("GET"))
            .and(path(route.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": id,
                "title": title,
                "price": price,
                "image": format!("https://cdn.example.com/{id}.jpg"),
            })))
            .mount(&self.server)
            .await;
        self
    }

    /// Register the stock record of a product
    pub async fn with_stock(&self, id: u64, amount: u32) -> &Self {
        Mock::given(method("GET"))
            .and(path(format!("/stock/{id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": id,
                "amount": amount,
            })))
            .mount(&self.server)
            .await;
        self
    }

    /// Make every call to `route` fail with a server error
    pub async fn with_failure(&self, route: &str) -> &Self {
        Mock::given(method("GET"))
            .and(path(route.to_string()))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream failure"))
            .mount(&self.server)
            .await;
        self
    }

    pub fn slot(&self) -> Arc<FilePersistenceSlot> {
        Arc::new(FilePersistenceSlot::new(&self.storage_dir, CART_KEY))
    }

    /// Raw value of the persistence slot file, if written
    pub fn stored_value(&self) -> Option<String> {
        std::fs::read_to_string(self.slot().path()).ok()
    }

    /// Load a manager the way the service does at startup
    pub async fn load_manager(&self) -> CartManager {
        let api = Arc::new(HttpStorefrontApi::new(&self.server.uri()).expect("valid mock URI"));
        CartManager::load(api.clone(), api, self.slot())
            .await
            .expect("Failed to load cart")
    }

    /// Number of requests the mock server received for `route`
    pub async fn request_count(&self, route: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|request| request.url.path() == route)
            .count()
    }
}

impl Drop for TestEnvironment {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.storage_dir);
    }
}
