//! # shop-payments
//!
//! The payment-confirmation and entitlement-fulfillment core of
//! guild-shop.
//!
//! ## Flow
//!
//! ```text
//! ┌──────────────┐   NormalizedEvent   ┌────────────────────┐
//! │   Webhook    │────────────────────▶│    Fulfillment     │
//! │   Verifier   │                     │      Engine        │
//! └──────────────┘                     └────────────────────┘
//!        ▲                                       ▲
//!   POST /webhook                          ManualApproval
//!                                                │
//!                                       ┌────────────────────┐
//!                                       │   Review Workflow  │
//!                                       │ (admin approve/deny)│
//!                                       └────────────────────┘
//! ```
//!
//! Two independent trust boundaries feed the engine: a cryptographically
//! signed provider webhook and a shared-secret provider webhook. The
//! manual review workflow is the human fallback; there the admin's
//! capability replaces signature verification as the trust anchor.
//!
//! Verified events are fulfilled unconditionally — there is no replay
//! tracking. Safety relies on role-grant being set membership and channel
//! deletion ignoring already-deleted channels.

mod checkout;
mod error;
mod event;
mod fulfill;
mod review;
mod webhook;

pub use checkout::{CheckoutClient, CheckoutSession};
pub use error::{PaymentError, Result, VerificationFailure};
pub use event::{NormalizedEvent, PaymentSource};
pub use fulfill::{FulfillmentEngine, FulfillmentOutcome};
pub use review::{
    Actor, ApprovalOutcome, DenyOutcome, ReviewTicket, ReviewWorkflow, TicketStatus,
};
pub use webhook::WebhookVerifier;
