//! Normalized Payment Event
//!
//! Provider-agnostic representation of "this user paid for this product".
//! Produced by the webhook verifier (or the manual approval path),
//! consumed exactly once by the fulfillment engine, then discarded.
//! Nothing is persisted and repeated notifications are not deduplicated.

/// Which trust boundary produced the event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaymentSource {
    /// Cryptographically signed provider webhook
    SignedProvider,

    /// Shared-secret provider webhook
    SharedSecret,

    /// Admin-attested manual approval; the actor's admin capability is
    /// the trust anchor
    ManualApproval,
}

/// A verified, normalized payment notification
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NormalizedEvent {
    pub source: PaymentSource,

    /// Purchaser's platform user id, as supplied by the provider
    pub external_user_id: String,

    /// Name of the product that was paid for
    pub product_name: String,

    /// Amount as reported by the provider; not verified against the
    /// catalog price
    pub raw_amount: Option<String>,
}

impl NormalizedEvent {
    pub fn new(
        source: PaymentSource,
        external_user_id: impl Into<String>,
        product_name: impl Into<String>,
    ) -> Self {
        Self {
            source,
            external_user_id: external_user_id.into(),
            product_name: product_name.into(),
            raw_amount: None,
        }
    }
}
