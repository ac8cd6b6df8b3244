//! File-Backed Document Store
//!
//! Persists the catalog and the global payment-method record as JSON
//! documents in a single file: a `products` collection keyed by product
//! name, and one `global_payments` document whose `methods` field holds
//! the global method map.
//!
//! Every write goes through a temp-file-then-rename cycle so a crash
//! mid-write never leaves a truncated store behind. Last writer wins on
//! concurrent upserts of the same product; there is no conflict detection.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::catalog::CatalogStore;
use crate::error::{Result, StoreError};
use crate::methods::PaymentMethodStore;
use crate::product::{MethodMap, Product};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct GlobalPayments {
    #[serde(default)]
    methods: MethodMap,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct Documents {
    #[serde(default)]
    products: BTreeMap<String, Product>,
    #[serde(default)]
    global_payments: GlobalPayments,
}

/// JSON-file document store implementing both store traits
pub struct JsonFileStore {
    path: PathBuf,
    docs: RwLock<Documents>,
}

impl JsonFileStore {
    /// Open a store at `path`, creating an empty one if the file is absent
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let docs = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            serde_json::from_str(&raw)?
        } else {
            Documents::default()
        };
        Ok(Self {
            path,
            docs: RwLock::new(docs),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, docs: &Documents) -> Result<()> {
        let raw = serde_json::to_string_pretty(docs)?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, raw)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl CatalogStore for JsonFileStore {
    fn upsert(&self, product: &Product) -> Result<()> {
        let mut docs = self.docs.write().unwrap();
        docs.products.insert(product.name.clone(), product.clone());
        self.flush(&docs)
    }

    fn get(&self, name: &str) -> Result<Option<Product>> {
        let docs = self.docs.read().unwrap();
        Ok(docs.products.get(name).cloned())
    }

    fn all(&self) -> Result<BTreeMap<String, Product>> {
        let docs = self.docs.read().unwrap();
        Ok(docs.products.clone())
    }

    fn delete(&self, name: &str) -> Result<()> {
        let mut docs = self.docs.write().unwrap();
        if docs.products.remove(name).is_some() {
            self.flush(&docs)?;
        }
        Ok(())
    }

    fn attach_link(&self, name: &str, method: &str, url: &str) -> Result<()> {
        let mut docs = self.docs.write().unwrap();
        let product = docs
            .products
            .get_mut(name)
            .ok_or_else(|| StoreError::ProductNotFound(name.to_string()))?;
        product.links.insert(method.to_string(), url.to_string());
        self.flush(&docs)
    }
}

impl PaymentMethodStore for JsonFileStore {
    fn set_global(&self, method: &str, url: &str) -> Result<()> {
        let mut docs = self.docs.write().unwrap();
        docs.global_payments
            .methods
            .insert(method.to_string(), url.to_string());
        self.flush(&docs)
    }

    fn globals(&self) -> Result<MethodMap> {
        let docs = self.docs.read().unwrap();
        Ok(docs.global_payments.methods.clone())
    }
}
