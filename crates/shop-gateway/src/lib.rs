//! # shop-gateway
//!
//! Chat-platform gateway abstraction for guild-shop.
//!
//! The storefront core never talks to the platform directly; everything
//! goes through [`PlatformGateway`], so fulfillment logic stays testable
//! and platform-agnostic. Two implementations ship here:
//!
//! - [`DiscordGateway`] — the real thing, over the Discord REST API.
//! - [`MockGateway`] — in-memory state with call recording, for tests.

mod discord;
mod error;
mod gateway;
mod mock;

pub use discord::{DiscordConfig, DiscordGateway};
pub use error::{GatewayError, Result};
pub use gateway::{Member, PlatformGateway, Role};
pub use mock::MockGateway;
