//! Payment Error Types

use thiserror::Error;

/// Result type alias for payment operations
pub type Result<T> = std::result::Result<T, PaymentError>;

/// Why an inbound payment notification was rejected
///
/// Always surfaced to the caller as an HTTP 4xx and never retried
/// internally.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationFailure {
    /// Signature header present but the payload does not verify
    #[error("Invalid signature")]
    InvalidSignature,

    /// Body unparseable, or required fields missing after authentication
    #[error("Invalid payload")]
    MalformedPayload,

    /// Shared secret missing, misconfigured, or mismatched
    #[error("Unauthorized")]
    Unauthorized,
}

/// Payment-processing errors
#[derive(Error, Debug)]
pub enum PaymentError {
    /// Catalog or payment-method store failure
    #[error("Store error: {0}")]
    Store(#[from] shop_core::StoreError),

    /// Chat-platform gateway failure
    #[error("Gateway error: {0}")]
    Gateway(#[from] shop_gateway::GatewayError),

    /// Checkout-session creation failed
    #[error("Checkout error: {0}")]
    Checkout(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
