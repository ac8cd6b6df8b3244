//! HTTP Handlers
//!
//! Two routes: a liveness probe and the unified webhook listener serving
//! both payment providers.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde_json::{json, Value};

use shop_payments::{FulfillmentOutcome, VerificationFailure};

use crate::state::AppState;

/// Signed-provider signature header
const SIGNATURE_HEADER: &str = "Stripe-Signature";

/// Liveness probe
pub async fn home() -> &'static str {
    "Bot is Online!"
}

/// Unified webhook listener
///
/// Verification failures map to 4xx. Everything after successful
/// verification — unknown product, missing member, even a gateway
/// failure during the grant — still answers 200: those failures are on
/// the merchant's side and a 5xx would only make the provider retry an
/// event that cannot succeed without admin intervention.
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    if body.is_empty() {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": "No data"})));
    }

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    let event = match state.verifier.verify(&body, signature) {
        Ok(Some(event)) => event,
        Ok(None) => {
            // Verified but not fulfillment-relevant; acknowledge and move on
            return (StatusCode::OK, Json(json!({"status": "success"})));
        }
        Err(failure) => {
            let status = match failure {
                VerificationFailure::Unauthorized => StatusCode::FORBIDDEN,
                VerificationFailure::InvalidSignature | VerificationFailure::MalformedPayload => {
                    StatusCode::BAD_REQUEST
                }
            };
            tracing::warn!(%failure, "Rejected inbound notification");
            return (status, Json(json!({"error": failure.to_string()})));
        }
    };

    tracing::info!(
        source = ?event.source,
        product = %event.product_name,
        user = %event.external_user_id,
        "Verified payment notification"
    );

    match state.engine.fulfill(&event).await {
        Ok(FulfillmentOutcome::Granted { .. }) => {}
        Ok(outcome) => {
            // Configuration drift; logged by the engine, remediated by admins
            tracing::warn!(?outcome, product = %event.product_name, "Payment not fulfilled");
        }
        Err(err) => {
            // No human is waiting on this response, so swallow and log
            tracing::error!(error = %err, "Fulfillment failed after verified payment");
        }
    }

    (StatusCode::OK, Json(json!({"status": "success"})))
}
