use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::models::{
    Cart, CartError, CartLineItem, CartOperation, CartResult, ProductId, StorageError,
    StorefrontApiError,
};
use crate::repositories::{PersistenceSlot, ProductCatalog, StockService};

/// Holds the shopper's cart and applies add/remove/update against the
/// catalog and stock services.
///
/// Every mutation is computed on a copy, written to the persistence slot, and
/// committed in memory only once the write succeeded.
pub struct CartManager {
    cart: Cart,
    catalog: Arc<dyn ProductCatalog>,
    stock: Arc<dyn StockService>,
    slot: Arc<dyn PersistenceSlot>,
}

impl CartManager {
    /// Create a manager around an existing cart
    pub fn new(
        cart: Cart,
        catalog: Arc<dyn ProductCatalog>,
        stock: Arc<dyn StockService>,
        slot: Arc<dyn PersistenceSlot>,
    ) -> Self {
        Self {
            cart,
            catalog,
            stock,
            slot,
        }
    }

    /// Rebuild the manager from the persistence slot.
    ///
    /// An empty slot gives an empty cart. A stored value that does not decode
    /// to a valid cart is discarded with a warning. Only a failure to read
    /// the slot at all is returned as an error.
    #[instrument(skip_all, fields(key = %slot.key()))]
    pub async fn load(
        catalog: Arc<dyn ProductCatalog>,
        stock: Arc<dyn StockService>,
        slot: Arc<dyn PersistenceSlot>,
    ) -> Result<Self, StorageError> {
        let cart = match slot.load().await? {
            Some(stored) => match serde_json::from_str::<Cart>(&stored) {
                Ok(cart) => {
                    info!("Restored cart with {} line items", cart.len());
                    cart
                }
                Err(e) => {
                    warn!("Discarding unreadable stored cart: {}", e);
                    Cart::new()
                }
            },
            None => {
                info!("No stored cart, starting empty");
                Cart::new()
            }
        };

        Ok(Self::new(cart, catalog, stock, slot))
    }

    /// Current cart
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Number of distinct products in the cart
    pub fn cart_size(&self) -> usize {
        self.cart.len()
    }

    /// Add one unit of a product.
    ///
    /// A product already in the cart is incremented when stock covers the new
    /// amount; an unknown one is looked up in the catalog and appended with
    /// amount 1.
    #[instrument(skip(self))]
    pub async fn add(&mut self, product_id: ProductId) -> CartResult<CartLineItem> {
        let operation = CartOperation::Add;
        let mut next = self.cart.clone();

        match self.cart.get_item(product_id) {
            Some(existing) => {
                let requested = existing.amount.saturating_add(1);
                self.ensure_stock(operation, product_id, requested).await?;
                next.set_item_amount(product_id, requested);
            }
            None => {
                let product = self
                    .catalog
                    .find_product(product_id)
                    .await
                    .map_err(|e| self.fail(operation, e))?
                    .ok_or_else(|| {
                        warn!("Product not found in catalog");
                        CartError::ProductNotFound { product_id }
                    })?;

                if product.id != product_id {
                    return Err(self.fail(
                        operation,
                        StorefrontApiError::Parse(format!(
                            "Catalog returned product {} for id {}",
                            product.id, product_id
                        )),
                    ));
                }

                if !next.push_product(product) {
                    return Err(self.fail(
                        operation,
                        StorefrontApiError::Parse(format!(
                            "Product {product_id} is already in the cart"
                        )),
                    ));
                }
            }
        }

        self.commit(operation, next).await?;
        let item = self.line_item(product_id)?;
        info!(amount = item.amount, "Product added to cart");
        Ok(item)
    }

    /// Remove a product from the cart
    #[instrument(skip(self))]
    pub async fn remove(&mut self, product_id: ProductId) -> CartResult<CartLineItem> {
        let mut next = self.cart.clone();
        let removed = next.remove_item(product_id).ok_or_else(|| {
            warn!("Product not in cart");
            CartError::ProductNotFound { product_id }
        })?;

        self.commit(CartOperation::Remove, next).await?;
        info!("Product removed from cart");
        Ok(removed)
    }

    /// Set the amount of a product already in the cart.
    ///
    /// An amount of zero or less is a no-op and returns `Ok(None)`.
    #[instrument(skip(self))]
    pub async fn update_amount(
        &mut self,
        product_id: ProductId,
        amount: i64,
    ) -> CartResult<Option<CartLineItem>> {
        if amount <= 0 {
            info!(amount, "Ignoring non-positive amount");
            return Ok(None);
        }

        let operation = CartOperation::UpdateAmount;
        if !self.cart.contains_item(product_id) {
            warn!("Product not in cart");
            return Err(CartError::NotInCart { product_id });
        }

        // Amounts beyond u32 can never be covered by a stock record.
        let requested = u32::try_from(amount).unwrap_or(u32::MAX);
        self.ensure_stock(operation, product_id, requested).await?;

        let mut next = self.cart.clone();
        next.set_item_amount(product_id, requested);

        self.commit(operation, next).await?;
        let item = self.line_item(product_id)?;
        info!(amount = item.amount, "Product amount updated");
        Ok(Some(item))
    }

    /// Fresh stock check for `requested` units
    async fn ensure_stock(
        &self,
        operation: CartOperation,
        product_id: ProductId,
        requested: u32,
    ) -> CartResult<()> {
        let stock = self
            .stock
            .find_stock(product_id)
            .await
            .map_err(|e| self.fail(operation, e))?;

        if stock.covers(requested) {
            return Ok(());
        }

        warn!(
            requested,
            available = stock.amount,
            "Requested quantity exceeds stock"
        );
        Err(CartError::StockExceeded {
            product_id,
            requested,
            available: stock.amount,
        })
    }

    /// Persist `next` and make it the current cart
    async fn commit(&mut self, operation: CartOperation, next: Cart) -> CartResult<()> {
        let serialized = serde_json::to_string(&next)
            .map_err(|e| self.fail(operation, StorageError::from(e)))?;

        self.slot
            .store(&serialized)
            .await
            .map_err(|e| self.fail(operation, e))?;

        self.cart = next;
        Ok(())
    }

    fn line_item(&self, product_id: ProductId) -> CartResult<CartLineItem> {
        self.cart
            .get_item(product_id)
            .cloned()
            .ok_or(CartError::ProductNotFound { product_id })
    }

    fn fail(
        &self,
        operation: CartOperation,
        source: impl Into<crate::models::FailureSource>,
    ) -> CartError {
        let err = CartError::failed(operation, source);
        error!("{}", err);
        err
    }
}

impl std::fmt::Debug for CartManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartManager")
            .field("cart", &self.cart)
            .field("slot", &self.slot.key())
            .finish_non_exhaustive()
    }
}
