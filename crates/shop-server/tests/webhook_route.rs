//! Webhook route tests over the full router with a mock gateway

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tower::util::ServiceExt;

use shop_core::{
    purchase_options, CatalogStore, GuildId, MemoryCatalogStore, MemoryPaymentMethodStore,
    PaymentMethodStore, Product, RoleId, UserId,
};
use shop_gateway::MockGateway;
use shop_payments::{FulfillmentEngine, ReviewWorkflow, WebhookVerifier};
use shop_server::{router, state::AppState};

const SIGNING_SECRET: &str = "whsec_test123secret456";
const SHARED_SECRET: &str = "sellapp_shared_secret";

const GUILD: GuildId = GuildId(1);
const BUYER: UserId = UserId(42);
const ROLE: RoleId = RoleId(100);

struct TestApp {
    router: Router,
    gateway: Arc<MockGateway>,
    catalog: Arc<MemoryCatalogStore>,
    methods: Arc<MemoryPaymentMethodStore>,
}

fn test_app() -> TestApp {
    let gateway = Arc::new(MockGateway::new());
    gateway.add_guild(GUILD);
    gateway.add_member(GUILD, BUYER, "buyer");
    gateway.add_role_def(GUILD, ROLE, "VIP Members");

    let catalog = Arc::new(MemoryCatalogStore::new());
    let methods = Arc::new(MemoryPaymentMethodStore::new());
    let engine = Arc::new(FulfillmentEngine::new(catalog.clone(), gateway.clone()));
    let review = Arc::new(
        ReviewWorkflow::new(catalog.clone(), gateway.clone(), engine.clone())
            .with_close_delay(Duration::ZERO),
    );

    let state = AppState {
        catalog: catalog.clone(),
        methods: methods.clone(),
        gateway: gateway.clone(),
        verifier: Arc::new(WebhookVerifier::new(
            Some(SIGNING_SECRET.into()),
            Some(SHARED_SECRET.into()),
        )),
        engine,
        review,
        checkout: None,
    };

    TestApp {
        router: router(state),
        gateway,
        catalog,
        methods,
    }
}

fn post_webhook(body: impl Into<Body>, signature: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("content-type", "application/json");
    if let Some(signature) = signature {
        builder = builder.header("Stripe-Signature", signature);
    }
    builder.body(body.into()).unwrap()
}

fn sign(body: &[u8], secret: &str) -> String {
    let timestamp = chrono::Utc::now().timestamp();
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(format!("{timestamp}.").as_bytes());
    mac.update(body);
    format!("t={timestamp},v1={}", hex::encode(mac.finalize().into_bytes()))
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn liveness_probe() {
    let app = test_app();
    let response = app
        .router
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"Bot is Online!");
}

#[tokio::test]
async fn empty_body_is_no_data() {
    let app = test_app();
    let response = app.router.oneshot(post_webhook(Body::empty(), None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "No data");
}

#[tokio::test]
async fn shared_secret_purchase_end_to_end() {
    let app = test_app();

    // Admin configures the store
    app.catalog
        .upsert(&Product::new("VIP", "10.00", ROLE, "VIP Members"))
        .unwrap();
    app.methods
        .set_global("PayPal", "https://pay.example/x")
        .unwrap();

    // Purchase-intent render offers PayPal
    let product = app.catalog.get("VIP").unwrap().unwrap();
    assert_eq!(product.price, "10.00");
    let options = purchase_options(&product, &app.methods.globals().unwrap(), false);
    assert_eq!(options.methods["PayPal"], "https://pay.example/x");

    // Provider notifies payment with the correct shared secret
    let body = serde_json::json!({
        "secret": SHARED_SECRET,
        "product_name": "VIP",
        "discord_user_id": BUYER.to_string()
    })
    .to_string();
    let response = app.router.oneshot(post_webhook(body, None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "success");
    assert_eq!(app.gateway.member_roles(GUILD, BUYER), vec![ROLE]);
    assert_eq!(app.gateway.dms_sent().len(), 1);
}

#[tokio::test]
async fn wrong_shared_secret_is_unauthorized() {
    let app = test_app();
    app.catalog
        .upsert(&Product::new("VIP", "10.00", ROLE, "VIP Members"))
        .unwrap();

    let body = serde_json::json!({
        "secret": "guessed",
        "product_name": "VIP",
        "discord_user_id": BUYER.to_string()
    })
    .to_string();
    let response = app.router.oneshot(post_webhook(body, None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["error"], "Unauthorized");
    assert!(app.gateway.grants().is_empty());
}

#[tokio::test]
async fn missing_product_field_is_invalid_payload() {
    let app = test_app();
    let body = serde_json::json!({
        "secret": SHARED_SECRET,
        "discord_user_id": BUYER.to_string()
    })
    .to_string();
    let response = app.router.oneshot(post_webhook(body, None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Invalid payload");
}

#[tokio::test]
async fn signed_checkout_grants_role() {
    let app = test_app();
    app.catalog
        .upsert(&Product::new("VIP", "10.00", ROLE, "VIP Members"))
        .unwrap();

    let body = serde_json::json!({
        "type": "checkout.session.completed",
        "data": {"object": {
            "client_reference_id": BUYER.to_string(),
            "metadata": {"product_name": "VIP"},
            "amount_total": 1000
        }}
    })
    .to_string();
    let signature = sign(body.as_bytes(), SIGNING_SECRET);
    let response = app
        .router
        .oneshot(post_webhook(body, Some(&signature)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.gateway.member_roles(GUILD, BUYER), vec![ROLE]);
}

#[tokio::test]
async fn tampered_signed_payload_is_invalid_signature() {
    let app = test_app();
    let body = serde_json::json!({
        "type": "checkout.session.completed",
        "data": {"object": {
            "client_reference_id": BUYER.to_string(),
            "metadata": {"product_name": "VIP"}
        }}
    })
    .to_string();
    let signature = sign(body.as_bytes(), SIGNING_SECRET);
    let tampered = format!("{body} ");

    let response = app
        .router
        .oneshot(post_webhook(tampered, Some(&signature)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Invalid signature");
    assert!(app.gateway.grants().is_empty());
}

#[tokio::test]
async fn irrelevant_signed_event_is_acknowledged() {
    let app = test_app();
    let body = serde_json::json!({
        "type": "customer.subscription.updated",
        "data": {"object": {}}
    })
    .to_string();
    let signature = sign(body.as_bytes(), SIGNING_SECRET);

    let response = app
        .router
        .oneshot(post_webhook(body, Some(&signature)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(app.gateway.grants().is_empty());
}

#[tokio::test]
async fn unknown_product_still_acknowledges() {
    let app = test_app();

    let body = serde_json::json!({
        "secret": SHARED_SECRET,
        "product_name": "Deleted",
        "discord_user_id": BUYER.to_string()
    })
    .to_string();
    let response = app.router.oneshot(post_webhook(body, None)).await.unwrap();

    // Merchant-side misconfiguration must not trigger provider retries
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "success");
    assert!(app.gateway.grants().is_empty());
}
