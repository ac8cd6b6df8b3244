//! Payment Method Registry
//!
//! Global default payment links, merged with per-product overrides at
//! purchase time.

use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::error::Result;
use crate::product::{MethodMap, Product};

/// Global payment-method storage trait
pub trait PaymentMethodStore: Send + Sync {
    /// Upsert a single global method → URL entry
    fn set_global(&self, method: &str, url: &str) -> Result<()>;

    /// Snapshot of the global method map
    fn globals(&self) -> Result<MethodMap>;
}

/// In-memory payment-method store (for development and tests)
pub struct MemoryPaymentMethodStore {
    methods: RwLock<MethodMap>,
}

impl Default for MemoryPaymentMethodStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPaymentMethodStore {
    pub fn new() -> Self {
        Self {
            methods: RwLock::new(BTreeMap::new()),
        }
    }
}

impl PaymentMethodStore for MemoryPaymentMethodStore {
    fn set_global(&self, method: &str, url: &str) -> Result<()> {
        let mut methods = self.methods.write().unwrap();
        methods.insert(method.to_string(), url.to_string());
        Ok(())
    }

    fn globals(&self) -> Result<MethodMap> {
        let methods = self.methods.read().unwrap();
        Ok(methods.clone())
    }
}

/// Stateless payment-method store used when no persistence is configured
pub struct NoopPaymentMethodStore;

impl PaymentMethodStore for NoopPaymentMethodStore {
    fn set_global(&self, method: &str, _url: &str) -> Result<()> {
        tracing::warn!(method, "Persistence disabled, payment method not saved");
        Ok(())
    }

    fn globals(&self) -> Result<MethodMap> {
        Ok(BTreeMap::new())
    }
}

/// Merge global methods with a product's specific links
///
/// Pure function: product links win on key collision. Computed fresh on
/// every purchase-intent render, never cached.
pub fn effective_methods(globals: &MethodMap, product: &Product) -> MethodMap {
    let mut merged = globals.clone();
    for (method, url) in &product.links {
        merged.insert(method.clone(), url.clone());
    }
    merged
}
