//! Webhook Verifier & Normalizer
//!
//! Validates inbound payment notifications from two independent untrusted
//! sources and normalizes them into a single internal event:
//!
//! 1. **Signed provider** — activates only when a signature header is
//!    present and a signing secret is configured. Timestamped HMAC-SHA256
//!    over the raw body, Stripe header format (`t=...,v1=...`).
//! 2. **Shared-secret provider** — JSON body carrying a constant `secret`
//!    field, compared against the configured value.
//!
//! The priority order is fixed: a present signature header always routes
//! to the signed path and never falls through to the shared-secret path,
//! so a tampered signed payload cannot be replayed as a shared-secret one.

use std::collections::BTreeMap;

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use crate::error::VerificationFailure;
use crate::event::{NormalizedEvent, PaymentSource};

type HmacSha256 = Hmac<Sha256>;

/// Reject signed payloads whose timestamp is further out than this
const TIMESTAMP_TOLERANCE_SECS: i64 = 300;

/// Fulfillment-relevant signed event type; everything else is verified,
/// acknowledged, and ignored
const CHECKOUT_COMPLETED: &str = "checkout.session.completed";

// ============================================================================
// Wire Types
// ============================================================================

/// Signed-provider event envelope
#[derive(Debug, Deserialize)]
struct SignedEvent {
    #[serde(rename = "type")]
    event_type: String,
    data: SignedEventData,
}

#[derive(Debug, Deserialize)]
struct SignedEventData {
    object: CheckoutObject,
}

#[derive(Debug, Default, Deserialize)]
struct CheckoutObject {
    /// Caller-supplied reference carrying the purchaser's user id
    client_reference_id: Option<String>,
    #[serde(default)]
    metadata: BTreeMap<String, String>,
    amount_total: Option<i64>,
}

/// Providers are inconsistent about whether ids travel as strings or
/// numbers; accept both.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IdField {
    Text(String),
    Number(u64),
}

impl IdField {
    fn into_string(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Number(n) => n.to_string(),
        }
    }
}

/// Shared-secret provider notification
#[derive(Debug, Deserialize)]
struct SharedNotification {
    secret: Option<String>,
    product_name: Option<String>,
    discord_user_id: Option<IdField>,
    amount: Option<IdField>,
}

// ============================================================================
// Verifier
// ============================================================================

/// Inbound-notification verifier
///
/// Either secret may be unconfigured; a path whose secret is absent can
/// never authenticate a request.
pub struct WebhookVerifier {
    signing_secret: Option<String>,
    shared_secret: Option<String>,
}

impl WebhookVerifier {
    pub fn new(signing_secret: Option<String>, shared_secret: Option<String>) -> Self {
        Self {
            signing_secret,
            shared_secret,
        }
    }

    /// Whether the signed-provider path can activate at all
    pub fn signed_path_configured(&self) -> bool {
        self.signing_secret.is_some()
    }

    /// Verify a raw notification and normalize it
    ///
    /// `Ok(None)` means the request was authentic but is not
    /// fulfillment-relevant (wrong event type, or a signature-valid event
    /// missing its reference fields). The HTTP layer must still
    /// acknowledge these with a success status so the provider does not
    /// retry.
    pub fn verify(
        &self,
        body: &[u8],
        signature_header: Option<&str>,
    ) -> std::result::Result<Option<NormalizedEvent>, VerificationFailure> {
        match (signature_header, &self.signing_secret) {
            (Some(signature), Some(secret)) => self.verify_signed(body, signature, secret),
            _ => self.verify_shared(body),
        }
    }

    fn verify_signed(
        &self,
        body: &[u8],
        signature_header: &str,
        secret: &str,
    ) -> std::result::Result<Option<NormalizedEvent>, VerificationFailure> {
        let (timestamp, signature) = parse_signature_header(signature_header)
            .ok_or(VerificationFailure::InvalidSignature)?;

        let age = (chrono::Utc::now().timestamp() - timestamp).abs();
        if age > TIMESTAMP_TOLERANCE_SECS {
            tracing::warn!(age_secs = age, "Webhook timestamp outside tolerance");
            return Err(VerificationFailure::InvalidSignature);
        }

        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|_| VerificationFailure::InvalidSignature)?;
        mac.update(format!("{timestamp}.").as_bytes());
        mac.update(body);
        mac.verify_slice(&signature)
            .map_err(|_| VerificationFailure::InvalidSignature)?;

        let event: SignedEvent =
            serde_json::from_slice(body).map_err(|_| VerificationFailure::MalformedPayload)?;

        if event.event_type != CHECKOUT_COMPLETED {
            tracing::debug!(event_type = %event.event_type, "Ignoring signed event type");
            return Ok(None);
        }

        let object = event.data.object;
        let (Some(user_id), Some(product_name)) = (
            object.client_reference_id,
            object.metadata.get("product_name").cloned(),
        ) else {
            // Signature-valid but unusable: drop it without erroring so the
            // provider does not keep retrying a permanently bad event.
            tracing::warn!("Completed checkout missing client reference or product metadata");
            return Ok(None);
        };

        Ok(Some(NormalizedEvent {
            source: PaymentSource::SignedProvider,
            external_user_id: user_id,
            product_name,
            raw_amount: object.amount_total.map(|cents| cents.to_string()),
        }))
    }

    fn verify_shared(
        &self,
        body: &[u8],
    ) -> std::result::Result<Option<NormalizedEvent>, VerificationFailure> {
        let notification: SharedNotification =
            serde_json::from_slice(body).map_err(|_| VerificationFailure::MalformedPayload)?;

        let Some(expected) = &self.shared_secret else {
            return Err(VerificationFailure::Unauthorized);
        };
        if notification.secret.as_deref() != Some(expected.as_str()) {
            return Err(VerificationFailure::Unauthorized);
        }

        let (Some(product_name), Some(user_id)) =
            (notification.product_name, notification.discord_user_id)
        else {
            return Err(VerificationFailure::MalformedPayload);
        };

        Ok(Some(NormalizedEvent {
            source: PaymentSource::SharedSecret,
            external_user_id: user_id.into_string(),
            product_name,
            raw_amount: notification.amount.map(IdField::into_string),
        }))
    }
}

/// Parse `t=<unix>,v1=<hex>` into (timestamp, signature bytes)
fn parse_signature_header(header: &str) -> Option<(i64, Vec<u8>)> {
    let mut timestamp = None;
    let mut signature = None;
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse::<i64>().ok(),
            Some(("v1", value)) => signature = hex::decode(value).ok(),
            _ => {}
        }
    }
    Some((timestamp?, signature?))
}
