//! Server Configuration
//!
//! All knobs come from the environment (a `.env` file is honored in the
//! binary). Only the platform token is required; every other subsystem
//! degrades when unconfigured rather than failing startup.

use std::path::PathBuf;

/// Environment-driven configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Platform bot token (required)
    pub platform_token: String,

    /// Document-store path; `None` disables all persistence
    pub db_path: Option<PathBuf>,

    /// Signed-provider webhook verification secret (`whsec_...`)
    pub signing_secret: Option<String>,

    /// Shared-secret provider value
    pub shared_secret: Option<String>,

    /// Signed-provider API key; enables the automated checkout flow
    pub checkout_api_key: Option<String>,

    /// HTTP bind address
    pub bind_addr: String,
}

impl Config {
    /// Load from the environment
    pub fn from_env() -> anyhow::Result<Self> {
        let platform_token = std::env::var("DISCORD_TOKEN")
            .map_err(|_| anyhow::anyhow!("DISCORD_TOKEN not set"))?;

        let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| {
            let port = std::env::var("PORT").unwrap_or_else(|_| "5000".into());
            format!("0.0.0.0:{port}")
        });

        Ok(Self {
            platform_token,
            db_path: std::env::var("SHOP_DB_PATH").ok().map(PathBuf::from),
            signing_secret: std::env::var("STRIPE_WEBHOOK_SECRET").ok(),
            shared_secret: std::env::var("SELLAPP_SECRET").ok(),
            checkout_api_key: std::env::var("STRIPE_API_KEY").ok(),
            bind_addr,
        })
    }
}
