//! Purchase Option Resolution
//!
//! Computes what a purchase-intent render should offer for a product:
//! the merged payment-link set, plus whether an automated checkout button
//! is available.

use crate::methods::effective_methods;
use crate::product::{MethodMap, Product};

/// Resolved payment options for one product
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PurchaseOptions {
    /// Manual payment links to offer (method → URL)
    pub methods: MethodMap,

    /// Whether the automated checkout flow is available
    pub automated_checkout: bool,
}

impl PurchaseOptions {
    /// True when there is nothing to offer at all
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty() && !self.automated_checkout
    }
}

/// Resolve purchase options for a product
///
/// When automated checkout is active, a manually configured "stripe" link
/// is dropped from the rendered set so the same processor is not offered
/// twice.
pub fn purchase_options(
    product: &Product,
    globals: &MethodMap,
    automated_checkout: bool,
) -> PurchaseOptions {
    let mut methods = effective_methods(globals, product);
    if automated_checkout {
        methods.retain(|method, _| !method.eq_ignore_ascii_case("stripe"));
    }
    PurchaseOptions {
        methods,
        automated_checkout,
    }
}
