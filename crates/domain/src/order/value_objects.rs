//! Value objects for the order domain.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use common::{ProductId, SellerRef, UserId};
use serde::{Deserialize, Serialize};

use super::{OrderError, OrderStatus};
use crate::payment::PaymentKind;

/// Variant or attribute selection made by the buyer for a line item.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SelectedVariant {
    /// Variant label, e.g. "Red / XL".
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub attributes: BTreeMap<String, String>,

    /// Price of this specific variant, when it differs from the base price.
    #[serde(default)]
    pub final_price: Option<f64>,
}

/// One line of a shopping cart, tagged with its seller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,

    pub name: String,

    pub quantity: u32,

    /// Base selling price per unit (after catalog discount).
    pub discount_price: f64,

    /// List price per unit, informational only.
    #[serde(default)]
    pub original_price: Option<f64>,

    #[serde(default)]
    pub selected_variant: Option<SelectedVariant>,

    /// Seller of this item, or the platform sentinel.
    pub seller: SellerRef,

    #[serde(default)]
    pub shop_name: String,
}

impl CartItem {
    /// Creates a line item with no variant selection.
    pub fn new(
        product_id: impl Into<ProductId>,
        name: impl Into<String>,
        quantity: u32,
        discount_price: f64,
        seller: impl Into<SellerRef>,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            name: name.into(),
            quantity,
            discount_price,
            original_price: None,
            selected_variant: None,
            seller: seller.into(),
            shop_name: String::new(),
        }
    }

    /// Sets the seller display name.
    pub fn with_shop_name(mut self, shop_name: impl Into<String>) -> Self {
        self.shop_name = shop_name.into();
        self
    }

    /// Attaches a variant selection.
    pub fn with_variant(mut self, variant: SelectedVariant) -> Self {
        self.selected_variant = Some(variant);
        self
    }

    /// Unit price actually charged: the variant's final price when present,
    /// otherwise the base discount price.
    pub fn effective_unit_price(&self) -> f64 {
        self.selected_variant
            .as_ref()
            .and_then(|variant| variant.final_price)
            .unwrap_or(self.discount_price)
    }

    /// Effective unit price times quantity.
    pub fn line_total(&self) -> f64 {
        self.effective_unit_price() * f64::from(self.quantity)
    }

    /// Rejects zero quantities and negative or non-finite prices.
    pub fn validate(&self) -> Result<(), OrderError> {
        if self.quantity == 0 {
            return Err(OrderError::InvalidQuantity {
                product_id: self.product_id.to_string(),
                quantity: self.quantity,
            });
        }

        let price = self.effective_unit_price();
        if !price.is_finite() || price < 0.0 {
            return Err(OrderError::InvalidPrice {
                product_id: self.product_id.to_string(),
                price,
            });
        }

        let line_total = self.line_total();
        if !line_total.is_finite() {
            return Err(OrderError::InvalidAmount {
                field: "line_total",
                amount: line_total,
            });
        }

        Ok(())
    }
}

/// Cart-wide charges entered at checkout, before apportioning to sellers.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AggregateTotals {
    #[serde(default)]
    pub shipping_price: f64,

    #[serde(default)]
    pub discount_price: f64,

    #[serde(default)]
    pub tax: f64,
}

impl AggregateTotals {
    pub fn new(shipping_price: f64, discount_price: f64, tax: f64) -> Self {
        Self {
            shipping_price,
            discount_price,
            tax,
        }
    }

    /// Every charge must be finite and non-negative.
    pub fn validate(&self) -> Result<(), OrderError> {
        for (field, amount) in [
            ("shipping_price", self.shipping_price),
            ("discount_price", self.discount_price),
            ("tax", self.tax),
        ] {
            if !amount.is_finite() || amount < 0.0 {
                return Err(OrderError::InvalidAmount { field, amount });
            }
        }
        Ok(())
    }
}

/// Delivery address captured at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub full_name: String,
    #[serde(default)]
    pub phone: String,
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: Option<String>,
    pub city: String,
    #[serde(default)]
    pub zip_code: String,
    pub country: String,
}

/// Buyer details captured at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyerSnapshot {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Settlement state of the buyer's payment, independent of order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentStatus {
    #[default]
    Pending,
    Succeeded,
    Failed,
}

/// Payment details of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentInfo {
    /// Gateway transaction reference, absent for cash payments.
    #[serde(default)]
    pub id: Option<String>,

    pub status: PaymentStatus,

    /// Payment method as declared by the client, e.g. "Credit Card" or "COD".
    pub method: String,

    /// Classification of `method`, resolved once when the order is placed.
    pub kind: PaymentKind,
}

impl PaymentInfo {
    /// Creates payment info, classifying the declared method.
    pub fn new(id: Option<String>, status: PaymentStatus, method: impl Into<String>) -> Self {
        let method = method.into();
        let kind = PaymentKind::classify(&method);
        Self {
            id,
            status,
            method,
            kind,
        }
    }

    pub fn is_cash_on_delivery(&self) -> bool {
        self.kind == PaymentKind::CashOnDelivery
    }
}

/// One entry of an order's append-only status log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub status: OrderStatus,
    pub timestamp: DateTime<Utc>,
    pub note: String,
}

/// Courier details supplied with a status update.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrackingInfo {
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub courier_partner: Option<String>,
    #[serde(default)]
    pub estimated_delivery: Option<DateTime<Utc>>,
}

impl TrackingInfo {
    /// Returns true when no field is set.
    pub fn is_empty(&self) -> bool {
        self.tracking_number.is_none()
            && self.courier_partner.is_none()
            && self.estimated_delivery.is_none()
    }
}
