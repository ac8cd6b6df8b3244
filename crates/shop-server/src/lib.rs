//! # shop-server
//!
//! Axum HTTP server for guild-shop: liveness probe plus the unified
//! webhook listener, wired over the storefront state.

pub mod config;
pub mod handlers;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::state::AppState;

/// Build the application router
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::home))
        .route("/webhook", post(handlers::webhook))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
