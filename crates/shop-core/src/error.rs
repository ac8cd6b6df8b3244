//! Store Error Types

use thiserror::Error;

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Catalog and payment-method store errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// Referenced product does not exist
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Price string is not a valid decimal amount
    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    /// Backend document could not be read or written
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Backend document could not be (de)serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
