use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::product::{format_price, Product, ProductId};

/// A product in the cart together with the chosen amount.
///
/// Serialized flat, product fields next to `amount`, which is the layout the
/// persistence slot stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLineItem {
    pub id: ProductId,
    pub title: String,
    pub price: Decimal,
    pub image: String,
    pub amount: u32,
}

/// Line item as presented to the storefront page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLineItemView {
    #[serde(flatten)]
    pub item: CartLineItem,
    pub price_formatted: String,
}

/// Response model for cart reads and successful mutations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartView {
    pub items: Vec<CartLineItemView>,
    pub cart_size: usize,
}

/// Request body for setting a line item amount.
///
/// Signed so that zero and negative amounts reach the cart manager, which
/// treats them as a no-op.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAmountRequest {
    pub amount: i64,
}

/// Violations found when rebuilding a cart from stored line items
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartInvariantError {
    #[error("Duplicate line item for product {id}")]
    DuplicateItem { id: ProductId },

    #[error("Line item for product {id} has zero amount")]
    ZeroAmount { id: ProductId },
}

/// Ordered shopping cart. Insertion order is display order and ids are unique.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CartLineItem>", into = "Vec<CartLineItem>")]
pub struct Cart {
    items: Vec<CartLineItem>,
}

impl Cart {
    /// Create a new empty cart
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cart from line items, checking uniqueness and amounts
    pub fn from_items(items: Vec<CartLineItem>) -> Result<Self, CartInvariantError> {
        for (index, item) in items.iter().enumerate() {
            if item.amount == 0 {
                return Err(CartInvariantError::ZeroAmount { id: item.id });
            }
            if items.iter().skip(index + 1).any(|other| other.id == item.id) {
                return Err(CartInvariantError::DuplicateItem { id: item.id });
            }
        }
        Ok(Self { items })
    }

    /// Line items in display order
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Number of distinct products in the cart
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the cart is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get a specific line item
    pub fn get_item(&self, id: ProductId) -> Option<&CartLineItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Check if a product is in the cart
    pub fn contains_item(&self, id: ProductId) -> bool {
        self.items.iter().any(|item| item.id == id)
    }

    /// Amount of a product in the cart, zero when absent
    pub fn get_item_amount(&self, id: ProductId) -> u32 {
        self.get_item(id).map(|item| item.amount).unwrap_or(0)
    }

    /// Append a product with amount 1. Returns false if it is already present.
    pub fn push_product(&mut self, product: Product) -> bool {
        if self.contains_item(product.id) {
            return false;
        }
        self.items.push(CartLineItem::from_product(product));
        true
    }

    /// Set the amount of an existing line item.
    ///
    /// Zero is refused; use [`Cart::remove_item`] to drop a product.
    pub fn set_item_amount(&mut self, id: ProductId, amount: u32) -> bool {
        if amount == 0 {
            return false;
        }
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.amount = amount;
                true
            }
            None => false,
        }
    }

    /// Remove a line item, returning it if it was present
    pub fn remove_item(&mut self, id: ProductId) -> Option<CartLineItem> {
        let position = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(position))
    }

    /// Build the page-facing view of this cart
    pub fn view(&self) -> CartView {
        CartView {
            items: self.items.iter().cloned().map(CartLineItemView::from).collect(),
            cart_size: self.len(),
        }
    }
}

impl TryFrom<Vec<CartLineItem>> for Cart {
    type Error = CartInvariantError;

    fn try_from(items: Vec<CartLineItem>) -> Result<Self, Self::Error> {
        Cart::from_items(items)
    }
}

impl From<Cart> for Vec<CartLineItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}

impl CartLineItem {
    /// New line item for a catalog product with amount 1
    pub fn from_product(product: Product) -> Self {
        Self {
            id: product.id,
            title: product.title,
            price: product.price,
            image: product.image,
            amount: 1,
        }
    }
}

impl From<CartLineItem> for CartLineItemView {
    fn from(item: CartLineItem) -> Self {
        let price_formatted = format_price(item.price);
        Self {
            item,
            price_formatted,
        }
    }
}
