//! Proportional allocation of cart-wide charges to sellers.
//!
//! Plain `f64` arithmetic with no rounding; rounding is left to whoever
//! displays the amounts.

use serde::{Deserialize, Serialize};

use crate::order::{AggregateTotals, CartItem};

/// A seller's share of a checkout.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SellerAllocation {
    /// Sum of effective price times quantity over the seller's items.
    pub sub_total: f64,
    pub shipping: f64,
    pub discount: f64,
    pub tax: f64,
    /// `sub_total + shipping + tax - discount`.
    pub total: f64,
}

/// Sum of effective price times quantity across a whole cart.
pub fn cart_value(items: &[CartItem]) -> f64 {
    items.iter().map(CartItem::line_total).sum()
}

/// Computes one seller group's share of the aggregate charges.
///
/// Each charge is split by `seller subtotal / total cart value`. A zero
/// cart value gives every share as zero.
pub fn allocate(
    group: &[CartItem],
    total_cart_value: f64,
    totals: &AggregateTotals,
) -> SellerAllocation {
    let sub_total = cart_value(group);
    let ratio = if total_cart_value > 0.0 {
        sub_total / total_cart_value
    } else {
        0.0
    };

    let shipping = ratio * totals.shipping_price;
    let discount = ratio * totals.discount_price;
    let tax = ratio * totals.tax;

    SellerAllocation {
        sub_total,
        shipping,
        discount,
        tax,
        total: sub_total + shipping + tax - discount,
    }
}
