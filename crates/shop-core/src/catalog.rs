//! Catalog Store
//!
//! Persistent mapping of product name → product record.

use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::error::{Result, StoreError};
use crate::product::Product;

/// Catalog storage trait
///
/// The catalog is small (at most a few hundred products), so snapshots are
/// returned whole and there is no pagination.
pub trait CatalogStore: Send + Sync {
    /// Insert or fully replace the product stored under `product.name`
    ///
    /// Re-adding a product resets its payment links: upsert is a full
    /// replace, not a merge. Use [`CatalogStore::attach_link`] to add links
    /// afterwards.
    fn upsert(&self, product: &Product) -> Result<()>;

    /// Get a product by name
    fn get(&self, name: &str) -> Result<Option<Product>>;

    /// Snapshot of all products keyed by name
    fn all(&self) -> Result<BTreeMap<String, Product>>;

    /// Delete a product; deleting an absent name is a no-op
    fn delete(&self, name: &str) -> Result<()>;

    /// Merge one payment link into an existing product
    ///
    /// Fails with [`StoreError::ProductNotFound`] if the product is absent.
    fn attach_link(&self, name: &str, method: &str, url: &str) -> Result<()>;
}

/// In-memory catalog store (for development and tests)
pub struct MemoryCatalogStore {
    products: RwLock<BTreeMap<String, Product>>,
}

impl Default for MemoryCatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        Self {
            products: RwLock::new(BTreeMap::new()),
        }
    }
}

impl CatalogStore for MemoryCatalogStore {
    fn upsert(&self, product: &Product) -> Result<()> {
        let mut products = self.products.write().unwrap();
        products.insert(product.name.clone(), product.clone());
        Ok(())
    }

    fn get(&self, name: &str) -> Result<Option<Product>> {
        let products = self.products.read().unwrap();
        Ok(products.get(name).cloned())
    }

    fn all(&self) -> Result<BTreeMap<String, Product>> {
        let products = self.products.read().unwrap();
        Ok(products.clone())
    }

    fn delete(&self, name: &str) -> Result<()> {
        let mut products = self.products.write().unwrap();
        products.remove(name);
        Ok(())
    }

    fn attach_link(&self, name: &str, method: &str, url: &str) -> Result<()> {
        let mut products = self.products.write().unwrap();
        let product = products
            .get_mut(name)
            .ok_or_else(|| StoreError::ProductNotFound(name.to_string()))?;
        product.links.insert(method.to_string(), url.to_string());
        Ok(())
    }
}

/// Stateless catalog used when no persistence is configured
///
/// Writes are no-ops and reads return empty collections, so the platform
/// connection stays usable even with storage misconfigured.
pub struct NoopCatalogStore;

impl CatalogStore for NoopCatalogStore {
    fn upsert(&self, product: &Product) -> Result<()> {
        tracing::warn!(product = %product.name, "Persistence disabled, product not saved");
        Ok(())
    }

    fn get(&self, _name: &str) -> Result<Option<Product>> {
        Ok(None)
    }

    fn all(&self) -> Result<BTreeMap<String, Product>> {
        Ok(BTreeMap::new())
    }

    fn delete(&self, _name: &str) -> Result<()> {
        Ok(())
    }

    fn attach_link(&self, name: &str, _method: &str, _url: &str) -> Result<()> {
        Err(StoreError::ProductNotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::RoleId;

    fn vip() -> Product {
        Product::new("VIP", "10.00", RoleId(100), "VIP Members")
    }

    #[test]
    fn test_upsert_and_get() {
        let store = MemoryCatalogStore::new();
        store.upsert(&vip()).unwrap();

        let found = store.get("VIP").unwrap().unwrap();
        assert_eq!(found.price, "10.00");
        assert_eq!(found.role_id, RoleId(100));
    }

    #[test]
    fn test_upsert_replaces_links() {
        let store = MemoryCatalogStore::new();
        store.upsert(&vip()).unwrap();
        store
            .attach_link("VIP", "PayPal", "https://pay.example/vip")
            .unwrap();

        // Re-adding the product resets its links
        store.upsert(&vip()).unwrap();
        let found = store.get("VIP").unwrap().unwrap();
        assert!(found.links.is_empty());
    }

    #[test]
    fn test_delete_is_idempotent() {
        let store = MemoryCatalogStore::new();
        store.upsert(&vip()).unwrap();

        store.delete("VIP").unwrap();
        assert!(!store.all().unwrap().contains_key("VIP"));

        // Deleting again (or deleting something that never existed) is fine
        store.delete("VIP").unwrap();
        store.delete("never-existed").unwrap();
        assert!(!store.all().unwrap().contains_key("VIP"));
    }

    #[test]
    fn test_attach_link_requires_product() {
        let store = MemoryCatalogStore::new();
        let err = store
            .attach_link("Ghost", "PayPal", "https://pay.example/x")
            .unwrap_err();
        assert!(matches!(err, StoreError::ProductNotFound(_)));
    }

    #[test]
    fn test_noop_store_is_empty() {
        let store = NoopCatalogStore;
        store.upsert(&vip()).unwrap();
        assert!(store.all().unwrap().is_empty());
        assert!(store.get("VIP").unwrap().is_none());
        store.delete("VIP").unwrap();
    }
}
