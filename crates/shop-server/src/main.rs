//! guild-shop HTTP Server
//!
//! Wires the catalog, payment-method registry, platform gateway, webhook
//! verifier, fulfillment engine, and review workflow into one axum app.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shop_core::{
    CatalogStore, JsonFileStore, NoopCatalogStore, NoopPaymentMethodStore, PaymentMethodStore,
};
use shop_gateway::{DiscordGateway, PlatformGateway};
use shop_payments::{CheckoutClient, FulfillmentEngine, ReviewWorkflow, WebhookVerifier};
use shop_server::{config::Config, router, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    // Persistence: one document store backs both the catalog and the
    // global payment-method record; without it the shop runs stateless so
    // the platform connection stays usable.
    let (catalog, methods): (Arc<dyn CatalogStore>, Arc<dyn PaymentMethodStore>) =
        match &config.db_path {
            Some(path) => {
                let store = Arc::new(JsonFileStore::open(path)?);
                tracing::info!(path = %store.path().display(), "✓ Document store opened");
                (store.clone(), store)
            }
            None => {
                tracing::warn!("⚠ SHOP_DB_PATH not set - data will not be saved");
                (Arc::new(NoopCatalogStore), Arc::new(NoopPaymentMethodStore))
            }
        };

    // Platform gateway
    let gateway: Arc<dyn PlatformGateway> =
        Arc::new(DiscordGateway::from_token(&config.platform_token));

    // Webhook verification
    let verifier = Arc::new(WebhookVerifier::new(
        config.signing_secret.clone(),
        config.shared_secret.clone(),
    ));
    if verifier.signed_path_configured() {
        tracing::info!("✓ Signed-provider webhooks enabled");
    } else {
        tracing::warn!("⚠ STRIPE_WEBHOOK_SECRET not set - signed webhooks disabled");
    }
    if config.shared_secret.is_none() {
        tracing::warn!("⚠ SELLAPP_SECRET not set - shared-secret webhooks disabled");
    }

    // Automated checkout
    let checkout = config
        .checkout_api_key
        .as_deref()
        .map(|key| Arc::new(CheckoutClient::new(key)));
    if checkout.is_some() {
        tracing::info!("✓ Automated checkout enabled");
    } else {
        tracing::warn!("⚠ STRIPE_API_KEY not set - automated checkout disabled");
    }

    // Fulfillment and manual review
    let engine = Arc::new(FulfillmentEngine::new(catalog.clone(), gateway.clone()));
    let review = Arc::new(ReviewWorkflow::new(
        catalog.clone(),
        gateway.clone(),
        engine.clone(),
    ));

    let state = AppState {
        catalog,
        methods,
        gateway,
        verifier,
        engine,
        review,
        checkout,
    };

    let app = router(state);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🛒 guild-shop server running on http://{}", config.bind_addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /        - Liveness probe");
    tracing::info!("  POST /webhook - Unified payment webhook");
    tracing::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}
