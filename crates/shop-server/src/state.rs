//! Application State
//!
//! Explicit context object constructed once at startup and passed into
//! every handler; there are no ambient singletons.

use std::sync::Arc;

use shop_core::{CatalogStore, PaymentMethodStore};
use shop_gateway::PlatformGateway;
use shop_payments::{CheckoutClient, FulfillmentEngine, ReviewWorkflow, WebhookVerifier};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Product catalog
    pub catalog: Arc<dyn CatalogStore>,

    /// Global payment-method registry
    pub methods: Arc<dyn PaymentMethodStore>,

    /// Chat-platform gateway
    pub gateway: Arc<dyn PlatformGateway>,

    /// Inbound-notification verifier
    pub verifier: Arc<WebhookVerifier>,

    /// Entitlement fulfillment engine
    pub engine: Arc<FulfillmentEngine>,

    /// Manual review workflow
    pub review: Arc<ReviewWorkflow>,

    /// Automated checkout (None when no API key is configured)
    pub checkout: Option<Arc<CheckoutClient>>,
}
