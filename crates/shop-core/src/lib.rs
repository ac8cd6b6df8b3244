//! # shop-core
//!
//! Product catalog, payment-method registry, and persistence for the
//! guild-shop storefront.
//!
//! The catalog maps product names to records binding a price and an
//! entitlement role; the payment-method registry holds global checkout
//! links that per-product links override at purchase time. Both are
//! addressed through storage traits with an in-memory implementation, a
//! file-backed document store, and a stateless no-op fallback used when
//! persistence is not configured.

mod catalog;
mod error;
mod ids;
mod jsonstore;
mod methods;
mod product;
mod purchase;

pub use catalog::{CatalogStore, MemoryCatalogStore, NoopCatalogStore};
pub use error::{Result, StoreError};
pub use ids::{ChannelId, GuildId, RoleId, UserId};
pub use jsonstore::JsonFileStore;
pub use methods::{
    effective_methods, MemoryPaymentMethodStore, NoopPaymentMethodStore, PaymentMethodStore,
};
pub use product::{MethodMap, Product};
pub use purchase::{purchase_options, PurchaseOptions};
