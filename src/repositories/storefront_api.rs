//! HTTP client for the storefront catalog and stock services.
//!
//! Both services live behind the same base URL:
//!
//! - `GET /products/{id}` returns a [`Product`]
//! - `GET /stock/{id}` returns a [`StockRecord`]
//!
//! No retries and no client-side timeouts; a failed call is returned to the
//! cart manager as is.

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use super::{ProductCatalog, StockService};
use crate::models::{ApiResult, Product, ProductId, StockRecord, StorefrontApiError};

/// reqwest-backed implementation of [`ProductCatalog`] and [`StockService`]
#[derive(Clone)]
pub struct HttpStorefrontApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpStorefrontApi {
    /// Create a client for the services under `base_url`.
    ///
    /// # Errors
    ///
    /// Returns error if the URL is not http(s) or the HTTP client fails to
    /// build.
    pub fn new(base_url: &str) -> ApiResult<Self> {
        parse_base_url(base_url)?;
        let trimmed = base_url.trim_end_matches('/');

        let client = reqwest::Client::builder().build()?;

        Ok(Self {
            client,
            base_url: trimmed.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Execute a GET request. A 404 is reported as `Ok(None)`.
    async fn get_optional<T: DeserializeOwned>(&self, path: &str) -> ApiResult<Option<T>> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "GET");

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if status.is_success() {
            return response
                .json()
                .await
                .map(Some)
                .map_err(|e| StorefrontApiError::Parse(format!("Failed to parse response: {e}")));
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        Err(StorefrontApiError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

/// Parse a service base URL, accepting only http(s) URLs with a host
pub fn parse_base_url(raw: &str) -> ApiResult<Url> {
    let url = Url::parse(raw)
        .map_err(|e| StorefrontApiError::InvalidBaseUrl(format!("{raw}: {e}")))?;

    match url.scheme() {
        "http" | "https" if url.host_str().is_some_and(|host| !host.is_empty()) => Ok(url),
        _ => Err(StorefrontApiError::InvalidBaseUrl(raw.to_string())),
    }
}

#[async_trait]
impl ProductCatalog for HttpStorefrontApi {
    #[instrument(skip(self), fields(product_id = id))]
    async fn find_product(&self, id: ProductId) -> ApiResult<Option<Product>> {
        self.get_optional(&format!("/products/{id}")).await
    }
}

#[async_trait]
impl StockService for HttpStorefrontApi {
    #[instrument(skip(self), fields(product_id = id))]
    async fn find_stock(&self, id: ProductId) -> ApiResult<StockRecord> {
        self.get_optional(&format!("/stock/{id}"))
            .await?
            .ok_or_else(|| StorefrontApiError::NotFound {
                resource: format!("stock/{id}"),
            })
    }
}

impl std::fmt::Debug for HttpStorefrontApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpStorefrontApi")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
