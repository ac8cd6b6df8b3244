//! Automated Checkout
//!
//! Creates hosted checkout sessions for the signed provider. The session
//! carries the purchaser's user id as the client reference and the
//! product name in metadata, which is exactly what the webhook verifier
//! reads back out of the completed-checkout event.
//!
//! Only available when the provider API key is configured; its presence
//! also switches the purchase-option render to the automated variant.

use std::collections::HashMap;

use stripe::{
    CheckoutSession as StripeCheckoutSession, CheckoutSessionMode, Client, CreateCheckoutSession,
    CreateCheckoutSessionLineItems, CreateCheckoutSessionLineItemsPriceData,
    CreateCheckoutSessionLineItemsPriceDataProductData, CreateCheckoutSessionPaymentMethodTypes,
    Currency,
};

use shop_core::{Product, UserId};

use crate::error::{PaymentError, Result};

/// Redirect target after checkout; back to the platform client
const RETURN_URL: &str = "https://discord.com/channels/@me";

/// Hosted checkout client
pub struct CheckoutClient {
    client: Client,
}

/// A created checkout session
#[derive(Clone, Debug)]
pub struct CheckoutSession {
    /// Provider session id
    pub id: String,

    /// URL to send the purchaser to
    pub checkout_url: String,
}

impl CheckoutClient {
    /// Create a new checkout client from a provider API key
    pub fn new(api_key: &str) -> Self {
        Self {
            client: Client::new(api_key),
        }
    }

    /// Create from the environment; `Err` when no key is configured
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("STRIPE_API_KEY")
            .map_err(|_| PaymentError::Config("STRIPE_API_KEY not set".into()))?;
        Ok(Self::new(&api_key))
    }

    /// Create a one-off hosted checkout session for a product
    pub async fn create_session(
        &self,
        product: &Product,
        buyer: UserId,
    ) -> Result<CheckoutSession> {
        let amount_cents = product.price_cents()?;
        let buyer_reference = buyer.to_string();

        let mut metadata = HashMap::new();
        metadata.insert("product_name".to_string(), product.name.clone());

        let mut params = CreateCheckoutSession::new();
        params.mode = Some(CheckoutSessionMode::Payment);
        params.client_reference_id = Some(&buyer_reference);
        params.metadata = Some(metadata);
        params.success_url = Some(RETURN_URL);
        params.cancel_url = Some(RETURN_URL);
        params.payment_method_types = Some(vec![
            CreateCheckoutSessionPaymentMethodTypes::Card,
            CreateCheckoutSessionPaymentMethodTypes::Cashapp,
        ]);
        params.line_items = Some(vec![CreateCheckoutSessionLineItems {
            quantity: Some(1),
            price_data: Some(CreateCheckoutSessionLineItemsPriceData {
                currency: Currency::USD,
                unit_amount: Some(amount_cents),
                product_data: Some(CreateCheckoutSessionLineItemsPriceDataProductData {
                    name: product.name.clone(),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        }]);

        let session = StripeCheckoutSession::create(&self.client, params)
            .await
            .map_err(|e| PaymentError::Checkout(e.to_string()))?;

        let checkout_url = session
            .url
            .ok_or_else(|| PaymentError::Checkout("No checkout URL returned".into()))?;

        Ok(CheckoutSession {
            id: session.id.to_string(),
            checkout_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_client_creation() {
        let _client = CheckoutClient::new("sk_test_xxx");
    }
}
