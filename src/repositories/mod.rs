// Repositories module - collaborators of the cart manager

pub mod persistence_slot;
pub mod storefront_api;

use async_trait::async_trait;

use crate::models::{ApiResult, Product, ProductId, StockRecord, StorageResult};

pub use persistence_slot::{FilePersistenceSlot, InMemoryPersistenceSlot};
pub use storefront_api::{parse_base_url, HttpStorefrontApi};

/// Read-only product lookup
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Find a product by id, `None` when the catalog does not know it
    async fn find_product(&self, id: ProductId) -> ApiResult<Option<Product>>;
}

/// Read-only quantity-on-hand lookup
#[async_trait]
pub trait StockService: Send + Sync {
    /// Fetch the current stock record of a product
    async fn find_stock(&self, id: ProductId) -> ApiResult<StockRecord>;
}

/// Single named key-value slot holding the serialized cart
#[async_trait]
pub trait PersistenceSlot: Send + Sync {
    /// Name of the slot
    fn key(&self) -> &str;

    /// Read the stored value, `None` if nothing was ever written
    async fn load(&self) -> StorageResult<Option<String>>;

    /// Overwrite the stored value
    async fn store(&self, value: &str) -> StorageResult<()>;
}
