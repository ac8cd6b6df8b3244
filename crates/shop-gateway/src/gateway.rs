//! Platform Gateway Trait
//!
//! Abstraction over the chat platform's guild/member/role and channel
//! operations. Implement this for each platform backend; the shipped
//! implementations are the Discord REST client and an in-memory mock.

use async_trait::async_trait;

use shop_core::{ChannelId, GuildId, RoleId, UserId};

use crate::error::Result;

/// A guild member as seen by the platform
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Member {
    pub user_id: UserId,
    pub display_name: String,
    /// Roles currently held (set semantics on the platform side)
    pub roles: Vec<RoleId>,
}

impl Member {
    pub fn holds_role(&self, role: RoleId) -> bool {
        self.roles.contains(&role)
    }
}

/// A guild role
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
}

/// Chat-platform gateway (Strategy pattern)
#[async_trait]
pub trait PlatformGateway: Send + Sync {
    /// Guilds the bot operates in, in lookup priority order
    async fn guilds(&self) -> Result<Vec<GuildId>>;

    /// Look up a member within one guild; `Ok(None)` when not a member
    async fn find_member(&self, guild: GuildId, user: UserId) -> Result<Option<Member>>;

    /// Look up a role within one guild; `Ok(None)` when absent
    async fn find_role(&self, guild: GuildId, role: RoleId) -> Result<Option<Role>>;

    /// Grant a role to a member
    ///
    /// Platform role-grant is set membership: granting an already-held
    /// role succeeds without duplicating anything.
    async fn add_role(&self, guild: GuildId, user: UserId, role: RoleId) -> Result<()>;

    /// Send a private message to a user
    async fn send_dm(&self, user: UserId, content: &str) -> Result<()>;

    /// Create a private order channel visible to the purchaser and admins
    async fn create_order_channel(
        &self,
        guild: GuildId,
        name: &str,
        visible_to: UserId,
    ) -> Result<ChannelId>;

    /// Post a message into a channel
    async fn send_channel_message(&self, channel: ChannelId, content: &str) -> Result<()>;

    /// Delete a channel
    ///
    /// Deleting an already-deleted channel MUST succeed: approve/deny
    /// races resolve through idempotent deletion, not locking.
    async fn delete_channel(&self, channel: ChannelId) -> Result<()>;

    /// Gateway backend name
    fn name(&self) -> &str;
}
