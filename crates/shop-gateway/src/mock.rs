//! Mock Platform Gateway
//!
//! For testing and demo purposes. Holds guild/member/role/channel state in
//! memory and records every mutating call so tests can assert on side
//! effects (grant counts, deletions, notification attempts).

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use shop_core::{ChannelId, GuildId, RoleId, UserId};

use crate::error::{GatewayError, Result};
use crate::gateway::{Member, PlatformGateway, Role};

/// In-memory gateway with call recording
#[derive(Default)]
pub struct MockGateway {
    guilds: RwLock<Vec<GuildId>>,
    members: RwLock<HashMap<(GuildId, UserId), Member>>,
    roles: RwLock<HashMap<(GuildId, RoleId), Role>>,
    channels: RwLock<HashSet<ChannelId>>,
    next_channel: AtomicU64,

    dms: RwLock<Vec<(UserId, String)>>,
    messages: RwLock<Vec<(ChannelId, String)>>,
    grants: RwLock<Vec<(GuildId, UserId, RoleId)>>,
    deletions: RwLock<Vec<ChannelId>>,
    api_calls: AtomicUsize,
    fail_dms: AtomicBool,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            next_channel: AtomicU64::new(9000),
            ..Self::default()
        }
    }

    // ------------------------------------------------------------------
    // Fixture setup
    // ------------------------------------------------------------------

    pub fn add_guild(&self, guild: GuildId) {
        self.guilds.write().unwrap().push(guild);
    }

    pub fn add_member(&self, guild: GuildId, user: UserId, display_name: impl Into<String>) {
        self.members.write().unwrap().insert(
            (guild, user),
            Member {
                user_id: user,
                display_name: display_name.into(),
                roles: Vec::new(),
            },
        );
    }

    pub fn add_role_def(&self, guild: GuildId, role: RoleId, name: impl Into<String>) {
        self.roles.write().unwrap().insert(
            (guild, role),
            Role {
                id: role,
                name: name.into(),
            },
        );
    }

    /// Make every DM attempt fail, simulating a closed inbox
    pub fn close_inboxes(&self) {
        self.fail_dms.store(true, Ordering::SeqCst);
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    /// Total gateway calls made, including lookups
    pub fn api_calls(&self) -> usize {
        self.api_calls.load(Ordering::SeqCst)
    }

    /// Every role-grant call recorded, including repeats
    pub fn grants(&self) -> Vec<(GuildId, UserId, RoleId)> {
        self.grants.read().unwrap().clone()
    }

    /// Roles currently held by a member (set semantics)
    pub fn member_roles(&self, guild: GuildId, user: UserId) -> Vec<RoleId> {
        self.members
            .read()
            .unwrap()
            .get(&(guild, user))
            .map(|m| m.roles.clone())
            .unwrap_or_default()
    }

    pub fn dms_sent(&self) -> Vec<(UserId, String)> {
        self.dms.read().unwrap().clone()
    }

    pub fn channel_messages(&self, channel: ChannelId) -> Vec<String> {
        self.messages
            .read()
            .unwrap()
            .iter()
            .filter(|(c, _)| *c == channel)
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn channel_exists(&self, channel: ChannelId) -> bool {
        self.channels.read().unwrap().contains(&channel)
    }

    /// Delete calls recorded, including calls against absent channels
    pub fn deletion_attempts(&self) -> Vec<ChannelId> {
        self.deletions.read().unwrap().clone()
    }

    fn count_call(&self) {
        self.api_calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl PlatformGateway for MockGateway {
    async fn guilds(&self) -> Result<Vec<GuildId>> {
        self.count_call();
        Ok(self.guilds.read().unwrap().clone())
    }

    async fn find_member(&self, guild: GuildId, user: UserId) -> Result<Option<Member>> {
        self.count_call();
        Ok(self.members.read().unwrap().get(&(guild, user)).cloned())
    }

    async fn find_role(&self, guild: GuildId, role: RoleId) -> Result<Option<Role>> {
        self.count_call();
        Ok(self.roles.read().unwrap().get(&(guild, role)).cloned())
    }

    async fn add_role(&self, guild: GuildId, user: UserId, role: RoleId) -> Result<()> {
        self.count_call();
        self.grants.write().unwrap().push((guild, user, role));

        let mut members = self.members.write().unwrap();
        let member = members.get_mut(&(guild, user)).ok_or(GatewayError::Api {
            status: 404,
            message: "Unknown member".into(),
        })?;
        // Set membership: granting an already-held role changes nothing
        if !member.roles.contains(&role) {
            member.roles.push(role);
        }
        Ok(())
    }

    async fn send_dm(&self, user: UserId, content: &str) -> Result<()> {
        self.count_call();
        if self.fail_dms.load(Ordering::SeqCst) {
            return Err(GatewayError::Api {
                status: 403,
                message: "Cannot send messages to this user".into(),
            });
        }
        self.dms.write().unwrap().push((user, content.to_string()));
        Ok(())
    }

    async fn create_order_channel(
        &self,
        _guild: GuildId,
        _name: &str,
        _visible_to: UserId,
    ) -> Result<ChannelId> {
        self.count_call();
        let channel = ChannelId(self.next_channel.fetch_add(1, Ordering::SeqCst));
        self.channels.write().unwrap().insert(channel);
        Ok(channel)
    }

    async fn send_channel_message(&self, channel: ChannelId, content: &str) -> Result<()> {
        self.count_call();
        self.messages
            .write()
            .unwrap()
            .push((channel, content.to_string()));
        Ok(())
    }

    async fn delete_channel(&self, channel: ChannelId) -> Result<()> {
        self.count_call();
        self.deletions.write().unwrap().push(channel);
        // Ignore-if-absent, same as the REST client's 404 handling
        self.channels.write().unwrap().remove(&channel);
        Ok(())
    }

    fn name(&self) -> &str {
        "MockGateway"
    }
}
