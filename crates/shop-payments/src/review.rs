//! Manual Review Workflow
//!
//! Fallback fulfillment path for self-attested payments. Each purchase
//! opens a private order channel; an admin later approves (granting the
//! entitlement through the fulfillment engine) or denies (deleting the
//! channel, keeping no record).
//!
//! Tickets live in memory only. There is no per-ticket lock: concurrent
//! approve/deny on the same ticket stays safe because every side effect
//! (role grant, channel deletion) is idempotent on the platform side.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use shop_core::{CatalogStore, ChannelId, GuildId, UserId};

use crate::error::Result;
use crate::event::{NormalizedEvent, PaymentSource};
use crate::fulfill::{FulfillmentEngine, FulfillmentOutcome};
use shop_gateway::PlatformGateway;

/// Delay between announcing approval and deleting the order channel
const DEFAULT_CLOSE_DELAY: Duration = Duration::from_secs(5);

/// Ticket lifecycle; `Approved` and `Denied` are terminal
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TicketStatus {
    Open,
    Approved,
    Denied,
}

impl TicketStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Approved | Self::Denied)
    }
}

/// A manual review ticket, keyed by its order channel
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReviewTicket {
    pub product_name: String,
    pub buyer: UserId,
    pub guild: GuildId,
    pub channel: ChannelId,
    pub status: TicketStatus,
}

/// Who is attempting a ticket transition
#[derive(Clone, Copy, Debug)]
pub struct Actor {
    pub user_id: UserId,
    /// Administrator capability in the operating guild
    pub admin: bool,
}

impl Actor {
    pub fn admin(user_id: UserId) -> Self {
        Self {
            user_id,
            admin: true,
        }
    }

    pub fn member(user_id: UserId) -> Self {
        Self {
            user_id,
            admin: false,
        }
    }
}

/// Result of an approve attempt
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApprovalOutcome {
    /// Entitlement granted; channel scheduled for deletion
    Approved,

    /// Actor lacks admin capability; nothing was invoked
    NotAuthorized,

    /// Ticket already approved or denied
    AlreadyResolved,

    /// No ticket known for this channel
    UnknownTicket,

    /// Product was deleted since the ticket opened; no state change
    ProductUnknown,

    /// Fulfillment could not grant (member or role missing); ticket stays
    /// open for remediation
    NotGranted(FulfillmentOutcome),
}

/// Result of a deny attempt
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DenyOutcome {
    Denied,
    NotAuthorized,
    AlreadyResolved,
    UnknownTicket,
}

/// Per-purchase manual review state machine
pub struct ReviewWorkflow {
    catalog: Arc<dyn CatalogStore>,
    gateway: Arc<dyn PlatformGateway>,
    engine: Arc<FulfillmentEngine>,
    tickets: RwLock<HashMap<ChannelId, ReviewTicket>>,
    close_delay: Duration,
}

impl ReviewWorkflow {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        gateway: Arc<dyn PlatformGateway>,
        engine: Arc<FulfillmentEngine>,
    ) -> Self {
        Self {
            catalog,
            gateway,
            engine,
            tickets: RwLock::new(HashMap::new()),
            close_delay: DEFAULT_CLOSE_DELAY,
        }
    }

    /// Override the post-approval close delay (tests use zero)
    pub fn with_close_delay(mut self, delay: Duration) -> Self {
        self.close_delay = delay;
        self
    }

    /// Snapshot a ticket by channel
    pub fn ticket(&self, channel: ChannelId) -> Option<ReviewTicket> {
        self.tickets.read().unwrap().get(&channel).cloned()
    }

    /// Open a ticket for a self-attested payment
    ///
    /// Creates the private order channel (visible to the purchaser; admins
    /// see everything anyway) and posts the order details.
    pub async fn open(
        &self,
        guild: GuildId,
        buyer: UserId,
        product_name: &str,
    ) -> Result<ReviewTicket> {
        let buyer_label = match self.gateway.find_member(guild, buyer).await {
            Ok(Some(member)) => member.display_name,
            _ => buyer.to_string(),
        };
        let channel_name = format!("order-{}", buyer_label.to_lowercase());
        let channel = self
            .gateway
            .create_order_channel(guild, &channel_name, buyer)
            .await?;

        self.gateway
            .send_channel_message(
                channel,
                &format!(
                    "New order from <@{buyer}> for **{product_name}**.\n\
                     Please upload a screenshot of your payment receipt here.\n\
                     An admin will verify and grant your role."
                ),
            )
            .await?;

        let ticket = ReviewTicket {
            product_name: product_name.to_string(),
            buyer,
            guild,
            channel,
            status: TicketStatus::Open,
        };
        self.tickets.write().unwrap().insert(channel, ticket.clone());
        tracing::info!(buyer = %buyer, product = product_name, channel = %channel, "Opened review ticket");
        Ok(ticket)
    }

    /// Approve a ticket and fulfill the purchase
    ///
    /// Only admins may approve; the actor's capability replaces webhook
    /// verification as the trust anchor. Platform failures during the
    /// grant propagate to the caller so the admin sees them.
    pub async fn approve(&self, channel: ChannelId, actor: &Actor) -> Result<ApprovalOutcome> {
        if !actor.admin {
            tracing::warn!(actor = %actor.user_id, "Non-admin approve attempt");
            return Ok(ApprovalOutcome::NotAuthorized);
        }

        let ticket = {
            let tickets = self.tickets.read().unwrap();
            match tickets.get(&channel) {
                None => return Ok(ApprovalOutcome::UnknownTicket),
                Some(ticket) if ticket.status.is_terminal() => {
                    return Ok(ApprovalOutcome::AlreadyResolved);
                }
                Some(ticket) => ticket.clone(),
            }
        };

        // Re-validate: the product may have been deleted since purchase
        if self.catalog.get(&ticket.product_name)?.is_none() {
            return Ok(ApprovalOutcome::ProductUnknown);
        }

        let event = NormalizedEvent::new(
            PaymentSource::ManualApproval,
            ticket.buyer.to_string(),
            ticket.product_name.clone(),
        );
        let outcome = self.engine.fulfill(&event).await?;
        let role = match outcome {
            FulfillmentOutcome::Granted { role, .. } => role,
            FulfillmentOutcome::ProductUnknown => return Ok(ApprovalOutcome::ProductUnknown),
            other => return Ok(ApprovalOutcome::NotGranted(other)),
        };

        // Terminal before the close delay, so a second approve during the
        // wait reports AlreadyResolved instead of re-granting.
        self.set_status(channel, TicketStatus::Approved);

        self.gateway
            .send_channel_message(
                channel,
                &format!(
                    "✅ Approved! **{}** given to <@{}>.\nTicket will close in {} seconds...",
                    role.name,
                    ticket.buyer,
                    self.close_delay.as_secs()
                ),
            )
            .await?;

        // Cooperative sleep: blocks only this task, not the loop
        tokio::time::sleep(self.close_delay).await;
        self.gateway.delete_channel(channel).await?;

        tracing::info!(channel = %channel, buyer = %ticket.buyer, "Ticket approved and closed");
        Ok(ApprovalOutcome::Approved)
    }

    /// Deny a ticket, deleting its channel and keeping no record
    pub async fn deny(&self, channel: ChannelId, actor: &Actor) -> Result<DenyOutcome> {
        if !actor.admin {
            tracing::warn!(actor = %actor.user_id, "Non-admin deny attempt");
            return Ok(DenyOutcome::NotAuthorized);
        }

        {
            let tickets = self.tickets.read().unwrap();
            match tickets.get(&channel) {
                None => return Ok(DenyOutcome::UnknownTicket),
                Some(ticket) if ticket.status.is_terminal() => {
                    return Ok(DenyOutcome::AlreadyResolved);
                }
                Some(_) => {}
            }
        }

        self.set_status(channel, TicketStatus::Denied);
        // Idempotent on the gateway side: already-deleted channels are fine
        self.gateway.delete_channel(channel).await?;

        tracing::info!(channel = %channel, "Ticket denied and closed");
        Ok(DenyOutcome::Denied)
    }

    fn set_status(&self, channel: ChannelId, status: TicketStatus) {
        if let Some(ticket) = self.tickets.write().unwrap().get_mut(&channel) {
            ticket.status = status;
        }
    }
}
