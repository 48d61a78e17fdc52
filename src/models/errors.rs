use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::product::ProductId;

/// Cart operations, used to label failures and metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CartOperation {
    Add,
    Remove,
    UpdateAmount,
}

impl CartOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            CartOperation::Add => "add",
            CartOperation::Remove => "remove",
            CartOperation::UpdateAmount => "update_amount",
        }
    }
}

impl std::fmt::Display for CartOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by a cart operation.
///
/// Every variant maps to a user-facing [`Notice`]; nothing escapes the
/// operation boundary as a panic.
#[derive(Debug, Error)]
pub enum CartError {
    #[error("Insufficient stock for product {product_id}: requested={requested}, available={available}")]
    StockExceeded {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    #[error("Product not found: {product_id}")]
    ProductNotFound { product_id: ProductId },

    #[error("Product not found in cart: {product_id}")]
    NotInCart { product_id: ProductId },

    #[error("Cart {operation} failed: {source}")]
    Failed {
        operation: CartOperation,
        #[source]
        source: FailureSource,
    },
}

/// Underlying cause of an unexpected operation failure
#[derive(Debug, Error)]
pub enum FailureSource {
    #[error(transparent)]
    Api(#[from] StorefrontApiError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl CartError {
    /// Wrap a collaborator error as the generic failure of `operation`
    pub fn failed(operation: CartOperation, source: impl Into<FailureSource>) -> Self {
        CartError::Failed {
            operation,
            source: source.into(),
        }
    }

    /// Whether the error is a business rejection rather than a fault
    pub fn is_rejection(&self) -> bool {
        !matches!(self, CartError::Failed { .. })
    }

    /// The transient notice shown to the shopper for this error
    pub fn notice(&self) -> Notice {
        let message = match self {
            CartError::StockExceeded { .. } => "Requested quantity exceeds stock",
            CartError::ProductNotFound { .. } => "Product not found",
            CartError::NotInCart { .. } => "Product not found in cart",
            CartError::Failed { operation, .. } => match operation {
                CartOperation::Add => "Error adding product",
                CartOperation::Remove => "Error removing product",
                CartOperation::UpdateAmount => "Error updating product amount",
            },
        };
        Notice::error(message)
    }
}

/// Errors from the catalog and stock HTTP services
#[derive(Debug, Error)]
pub enum StorefrontApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

/// Errors from the persistence slot
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error for key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
}

/// Severity of a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Error,
}

/// Transient message for the shopper, the toast of the storefront page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Result type alias for cart operations
pub type CartResult<T> = Result<T, CartError>;

/// Result type alias for catalog and stock calls
pub type ApiResult<T> = Result<T, StorefrontApiError>;

/// Result type alias for persistence slot access
pub type StorageResult<T> = Result<T, StorageError>;
