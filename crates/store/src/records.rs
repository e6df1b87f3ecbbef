//! Catalog and seller records the order core reads and increments.

use common::{ProductId, ShopId};
use serde::{Deserialize, Serialize};

/// Stock counters of a catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Units on hand. Not clamped at zero.
    pub stock: i64,
    /// Units handed to couriers, net of restorations.
    pub sold_out: i64,
}

impl Product {
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, stock: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            stock,
            sold_out: 0,
        }
    }
}

/// A seller and its wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shop {
    pub id: ShopId,
    pub name: String,
    pub available_balance: f64,
}

impl Shop {
    pub fn new(id: impl Into<ShopId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            available_balance: 0.0,
        }
    }
}
