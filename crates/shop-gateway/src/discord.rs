//! Discord REST Gateway
//!
//! Implementation of [`PlatformGateway`] over the Discord REST API (v10)
//! with bot-token authentication. Snowflake ids travel as strings on the
//! wire and are parsed into the typed ids at the boundary.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use shop_core::{ChannelId, GuildId, RoleId, UserId};

use crate::error::{GatewayError, Result};
use crate::gateway::{Member, PlatformGateway, Role};

/// View-channel permission bit
const VIEW_CHANNEL: u64 = 1 << 10;
/// Send-messages permission bit
const SEND_MESSAGES: u64 = 1 << 11;
/// Guild text channel type
const CHANNEL_TYPE_TEXT: u8 = 0;

/// Discord gateway configuration
#[derive(Clone, Debug)]
pub struct DiscordConfig {
    /// Bot token
    pub token: String,

    /// REST API base URL (overridable for tests)
    pub base_url: String,
}

impl DiscordConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            base_url: "https://discord.com/api/v10".into(),
        }
    }
}

/// Discord REST client implementing [`PlatformGateway`]
pub struct DiscordGateway {
    client: reqwest::Client,
    config: DiscordConfig,
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct WireGuild {
    id: String,
}

#[derive(Debug, Deserialize)]
struct WireUser {
    id: String,
    username: String,
    global_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireMember {
    user: WireUser,
    nick: Option<String>,
    #[serde(default)]
    roles: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct WireRole {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct WireChannel {
    id: String,
}

#[derive(Debug, Serialize)]
struct CreateDmRequest {
    recipient_id: String,
}

#[derive(Debug, Serialize)]
struct CreateMessageRequest<'a> {
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct PermissionOverwrite {
    id: String,
    /// 0 = role overwrite, 1 = member overwrite
    #[serde(rename = "type")]
    kind: u8,
    allow: String,
    deny: String,
}

#[derive(Debug, Serialize)]
struct CreateChannelRequest<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    kind: u8,
    permission_overwrites: Vec<PermissionOverwrite>,
}

fn parse_snowflake(raw: &str) -> Result<u64> {
    raw.parse::<u64>()
        .map_err(|_| GatewayError::UnexpectedResponse(format!("bad snowflake: {raw}")))
}

impl DiscordGateway {
    pub fn new(config: DiscordConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Create from a bot token with the default API base URL
    pub fn from_token(token: impl Into<String>) -> Self {
        Self::new(DiscordConfig::new(token))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    fn auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request.header("Authorization", format!("Bot {}", self.config.token))
    }

    /// Map an error response body into [`GatewayError::Api`]
    async fn api_error(response: reqwest::Response) -> GatewayError {
        let status = response.status().as_u16();
        let message = response.text().await.unwrap_or_default();
        GatewayError::Api { status, message }
    }
}

#[async_trait]
impl PlatformGateway for DiscordGateway {
    async fn guilds(&self) -> Result<Vec<GuildId>> {
        let response = self
            .auth(self.client.get(self.url("/users/@me/guilds")))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        let guilds: Vec<WireGuild> = response.json().await?;
        guilds
            .iter()
            .map(|g| parse_snowflake(&g.id).map(GuildId))
            .collect()
    }

    async fn find_member(&self, guild: GuildId, user: UserId) -> Result<Option<Member>> {
        let response = self
            .auth(
                self.client
                    .get(self.url(&format!("/guilds/{guild}/members/{user}"))),
            )
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let member: WireMember = response.json().await?;
        let display_name = member
            .nick
            .or(member.user.global_name)
            .unwrap_or_else(|| member.user.username.clone());
        let roles = member
            .roles
            .iter()
            .map(|r| parse_snowflake(r).map(RoleId))
            .collect::<Result<Vec<_>>>()?;

        Ok(Some(Member {
            user_id: UserId(parse_snowflake(&member.user.id)?),
            display_name,
            roles,
        }))
    }

    async fn find_role(&self, guild: GuildId, role: RoleId) -> Result<Option<Role>> {
        let response = self
            .auth(self.client.get(self.url(&format!("/guilds/{guild}/roles"))))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let roles: Vec<WireRole> = response.json().await?;
        for wire in roles {
            if parse_snowflake(&wire.id)? == role.get() {
                return Ok(Some(Role {
                    id: role,
                    name: wire.name,
                }));
            }
        }
        Ok(None)
    }

    async fn add_role(&self, guild: GuildId, user: UserId, role: RoleId) -> Result<()> {
        let response = self
            .auth(
                self.client
                    .put(self.url(&format!("/guilds/{guild}/members/{user}/roles/{role}"))),
            )
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        Ok(())
    }

    async fn send_dm(&self, user: UserId, content: &str) -> Result<()> {
        // Discord requires opening (or reusing) a DM channel first
        let response = self
            .auth(self.client.post(self.url("/users/@me/channels")))
            .json(&CreateDmRequest {
                recipient_id: user.to_string(),
            })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        let channel: WireChannel = response.json().await?;

        self.send_channel_message(ChannelId(parse_snowflake(&channel.id)?), content)
            .await
    }

    async fn create_order_channel(
        &self,
        guild: GuildId,
        name: &str,
        visible_to: UserId,
    ) -> Result<ChannelId> {
        // @everyone overwrite uses the guild id; admins bypass deny bits
        let overwrites = vec![
            PermissionOverwrite {
                id: guild.to_string(),
                kind: 0,
                allow: "0".into(),
                deny: VIEW_CHANNEL.to_string(),
            },
            PermissionOverwrite {
                id: visible_to.to_string(),
                kind: 1,
                allow: (VIEW_CHANNEL | SEND_MESSAGES).to_string(),
                deny: "0".into(),
            },
        ];

        let response = self
            .auth(self.client.post(self.url(&format!("/guilds/{guild}/channels"))))
            .json(&CreateChannelRequest {
                name,
                kind: CHANNEL_TYPE_TEXT,
                permission_overwrites: overwrites,
            })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let channel: WireChannel = response.json().await?;
        Ok(ChannelId(parse_snowflake(&channel.id)?))
    }

    async fn send_channel_message(&self, channel: ChannelId, content: &str) -> Result<()> {
        let response = self
            .auth(
                self.client
                    .post(self.url(&format!("/channels/{channel}/messages"))),
            )
            .json(&CreateMessageRequest { content })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        Ok(())
    }

    async fn delete_channel(&self, channel: ChannelId) -> Result<()> {
        let response = self
            .auth(self.client.delete(self.url(&format!("/channels/{channel}"))))
            .send()
            .await?;
        // Already gone counts as deleted
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "Discord"
    }
}
