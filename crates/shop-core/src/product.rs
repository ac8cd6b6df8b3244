//! Product Model
//!
//! A product is a purchasable offering bound to one entitlement role.

use std::collections::BTreeMap;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};
use crate::ids::RoleId;

/// Payment method name → checkout URL
pub type MethodMap = BTreeMap<String, String>;

/// A purchasable product
///
/// The name is the primary key: catalog operations address products by
/// name, and payment events carry the name to identify what was bought.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Unique product name
    pub name: String,

    /// Price as a decimal string, e.g. "10.00" (currency implicit)
    pub price: String,

    /// Entitlement role granted on fulfillment
    pub role_id: RoleId,

    /// Cached role display name; may drift from the live role
    pub role_name: String,

    /// Product-specific payment links, overriding globals on collision
    #[serde(default)]
    pub links: MethodMap,
}

impl Product {
    /// Create a product with no product-specific links
    pub fn new(
        name: impl Into<String>,
        price: impl Into<String>,
        role_id: RoleId,
        role_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            price: price.into(),
            role_id,
            role_name: role_name.into(),
            links: MethodMap::new(),
        }
    }

    /// Parse the price string into a [`Decimal`]
    pub fn price_decimal(&self) -> Result<Decimal> {
        self.price
            .trim()
            .parse::<Decimal>()
            .map_err(|_| StoreError::InvalidPrice(self.price.clone()))
    }

    /// Price in minor units (cents), for checkout-session creation
    ///
    /// Rejects negative prices and amounts with more than two decimal
    /// places rather than silently rounding.
    pub fn price_cents(&self) -> Result<i64> {
        let amount = self.price_decimal()?;
        if amount.is_sign_negative() || amount.scale() > 2 {
            return Err(StoreError::InvalidPrice(self.price.clone()));
        }
        let cents = amount * Decimal::from(100);
        cents
            .to_i64()
            .ok_or_else(|| StoreError::InvalidPrice(self.price.clone()))
    }
}
