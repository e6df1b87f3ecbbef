//! Checkout planning: validate, partition and allocate in one pure step.

use crate::order::{AggregateTotals, CartItem, OrderError};
use crate::partition::{SellerGroup, partition_by_seller};
use crate::pricing::{SellerAllocation, allocate, cart_value};

/// One seller's slice of a checkout, ready to become an order.
#[derive(Debug, Clone, PartialEq)]
pub struct SellerShare {
    pub group: SellerGroup,
    pub pricing: SellerAllocation,
}

/// Splits a validated cart into per-seller shares.
///
/// Rejects empty carts, bad line items and negative charges before any
/// share is computed, and any cart whose amounts do not fit in an `f64`.
pub fn plan_checkout(
    cart: Vec<CartItem>,
    totals: &AggregateTotals,
) -> Result<Vec<SellerShare>, OrderError> {
    if cart.is_empty() {
        return Err(OrderError::EmptyCart);
    }
    for item in &cart {
        item.validate()?;
    }
    totals.validate()?;

    let total_cart_value = cart_value(&cart);
    if !total_cart_value.is_finite() {
        return Err(OrderError::InvalidAmount {
            field: "cart_value",
            amount: total_cart_value,
        });
    }

    partition_by_seller(cart)
        .into_iter()
        .map(|group| {
            let pricing = allocate(&group.items, total_cart_value, totals);
            if !pricing.total.is_finite() {
                return Err(OrderError::InvalidAmount {
                    field: "total_price",
                    amount: pricing.total,
                });
            }
            Ok(SellerShare { group, pricing })
        })
        .collect()
}
