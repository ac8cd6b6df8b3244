//! Fulfillment Engine
//!
//! Converts a normalized payment event into a granted entitlement:
//! resolve the product's role, locate the member, grant the role, and
//! send a best-effort notification. Role-grant is set membership on the
//! platform side, so fulfilling the same event twice never double-grants.

use std::sync::Arc;

use shop_core::{CatalogStore, GuildId, UserId};
use shop_gateway::{PlatformGateway, Role};

use crate::error::Result;
use crate::event::NormalizedEvent;

/// What fulfilling an event amounted to
///
/// The non-`Granted` variants represent configuration drift: they are
/// logged and require manual admin remediation, never automatic retry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FulfillmentOutcome {
    /// Role granted (or already held) in this guild
    Granted { guild: GuildId, role: Role },

    /// Event references a product the catalog does not know
    ProductUnknown,

    /// Purchaser is not a member of any operating guild
    MemberNotFound,

    /// Product's role id no longer exists in the member's guild
    RoleNotFound,
}

/// Fulfillment engine
pub struct FulfillmentEngine {
    catalog: Arc<dyn CatalogStore>,
    gateway: Arc<dyn PlatformGateway>,
}

impl FulfillmentEngine {
    pub fn new(catalog: Arc<dyn CatalogStore>, gateway: Arc<dyn PlatformGateway>) -> Self {
        Self { catalog, gateway }
    }

    /// Fulfill a verified payment event
    ///
    /// Transport failures surface as errors; everything expected is an
    /// outcome. The catalog lookup happens before any gateway call, so an
    /// unknown product costs zero platform API traffic.
    pub async fn fulfill(&self, event: &NormalizedEvent) -> Result<FulfillmentOutcome> {
        let Some(product) = self.catalog.get(&event.product_name)? else {
            tracing::warn!(product = %event.product_name, "Payment for unknown product");
            return Ok(FulfillmentOutcome::ProductUnknown);
        };

        let Ok(user) = event.external_user_id.parse::<UserId>() else {
            tracing::warn!(user = %event.external_user_id, "Unparseable purchaser id");
            return Ok(FulfillmentOutcome::MemberNotFound);
        };

        // First guild containing the member wins, then stop
        let mut located = None;
        for guild in self.gateway.guilds().await? {
            if let Some(member) = self.gateway.find_member(guild, user).await? {
                located = Some((guild, member));
                break;
            }
        }
        let Some((guild, member)) = located else {
            tracing::warn!(user = %user, "Purchaser not found in any operating guild");
            return Ok(FulfillmentOutcome::MemberNotFound);
        };

        let Some(role) = self.gateway.find_role(guild, product.role_id).await? else {
            tracing::warn!(
                role = %product.role_id,
                guild = %guild,
                "Product role missing from guild"
            );
            return Ok(FulfillmentOutcome::RoleNotFound);
        };

        self.gateway.add_role(guild, user, role.id).await?;
        tracing::info!(
            user = %member.display_name,
            role = %role.name,
            source = ?event.source,
            "Entitlement granted"
        );

        // Notification is cosmetic: a closed inbox must not fail fulfillment
        let message = format!(
            "🎉 Payment received! You have been given the **{}** role.",
            role.name
        );
        if let Err(err) = self.gateway.send_dm(user, &message).await {
            tracing::warn!(user = %user, error = %err, "Could not notify purchaser");
        }

        Ok(FulfillmentOutcome::Granted { guild, role })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shop_core::{MemoryCatalogStore, Product, RoleId};
    use shop_gateway::MockGateway;

    use crate::event::{PaymentSource, NormalizedEvent};

    const GUILD: GuildId = GuildId(1);
    const BUYER: UserId = UserId(42);
    const ROLE: RoleId = RoleId(7);

    fn engine_with(gateway: Arc<MockGateway>) -> FulfillmentEngine {
        let catalog = Arc::new(MemoryCatalogStore::new());
        catalog
            .upsert(&Product::new("VIP", "10.00", ROLE, "VIP Members"))
            .unwrap();
        FulfillmentEngine::new(catalog, gateway)
    }

    fn paid_event() -> NormalizedEvent {
        NormalizedEvent::new(PaymentSource::SharedSecret, "42", "VIP")
    }

    #[tokio::test]
    async fn test_grant_happy_path() {
        let gateway = Arc::new(MockGateway::new());
        gateway.add_guild(GUILD);
        gateway.add_member(GUILD, BUYER, "buyer");
        gateway.add_role_def(GUILD, ROLE, "VIP Members");

        let outcome = engine_with(gateway.clone()).fulfill(&paid_event()).await.unwrap();
        assert!(matches!(outcome, FulfillmentOutcome::Granted { guild: GUILD, .. }));
        assert_eq!(gateway.member_roles(GUILD, BUYER), vec![ROLE]);
        assert_eq!(gateway.dms_sent().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_product_makes_no_gateway_calls() {
        let gateway = Arc::new(MockGateway::new());
        gateway.add_guild(GUILD);

        let engine = engine_with(gateway.clone());
        let event = NormalizedEvent::new(PaymentSource::SharedSecret, "42", "Deleted");
        let outcome = engine.fulfill(&event).await.unwrap();

        assert_eq!(outcome, FulfillmentOutcome::ProductUnknown);
        assert_eq!(gateway.api_calls(), 0);
    }

    #[tokio::test]
    async fn test_member_not_found() {
        let gateway = Arc::new(MockGateway::new());
        gateway.add_guild(GUILD);
        gateway.add_role_def(GUILD, ROLE, "VIP Members");

        let outcome = engine_with(gateway).fulfill(&paid_event()).await.unwrap();
        assert_eq!(outcome, FulfillmentOutcome::MemberNotFound);
    }

    #[tokio::test]
    async fn test_role_not_found() {
        let gateway = Arc::new(MockGateway::new());
        gateway.add_guild(GUILD);
        gateway.add_member(GUILD, BUYER, "buyer");

        let outcome = engine_with(gateway).fulfill(&paid_event()).await.unwrap();
        assert_eq!(outcome, FulfillmentOutcome::RoleNotFound);
    }

    #[tokio::test]
    async fn test_fulfill_is_idempotent() {
        let gateway = Arc::new(MockGateway::new());
        gateway.add_guild(GUILD);
        gateway.add_member(GUILD, BUYER, "buyer");
        gateway.add_role_def(GUILD, ROLE, "VIP Members");

        let engine = engine_with(gateway.clone());
        let first = engine.fulfill(&paid_event()).await.unwrap();
        let second = engine.fulfill(&paid_event()).await.unwrap();

        assert!(matches!(first, FulfillmentOutcome::Granted { .. }));
        assert!(matches!(second, FulfillmentOutcome::Granted { .. }));
        // Role set membership, not a counter
        assert_eq!(gateway.member_roles(GUILD, BUYER), vec![ROLE]);
    }

    #[tokio::test]
    async fn test_closed_inbox_does_not_fail_grant() {
        let gateway = Arc::new(MockGateway::new());
        gateway.add_guild(GUILD);
        gateway.add_member(GUILD, BUYER, "buyer");
        gateway.add_role_def(GUILD, ROLE, "VIP Members");
        gateway.close_inboxes();

        let outcome = engine_with(gateway.clone()).fulfill(&paid_event()).await.unwrap();
        assert!(matches!(outcome, FulfillmentOutcome::Granted { .. }));
        assert!(gateway.dms_sent().is_empty());
    }

    #[tokio::test]
    async fn test_first_matching_guild_wins() {
        let gateway = Arc::new(MockGateway::new());
        let second = GuildId(2);
        gateway.add_guild(GUILD);
        gateway.add_guild(second);
        // Member exists only in the second guild
        gateway.add_member(second, BUYER, "buyer");
        gateway.add_role_def(second, ROLE, "VIP Members");

        let outcome = engine_with(gateway).fulfill(&paid_event()).await.unwrap();
        assert!(matches!(outcome, FulfillmentOutcome::Granted { guild, .. } if guild == second));
    }
}
