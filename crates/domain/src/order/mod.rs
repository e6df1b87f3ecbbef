//! Seller order model and its status state machine.

mod aggregate;
mod events;
mod state;
mod value_objects;

pub use aggregate::{NewOrder, Order};
pub use events::{OrderCancelledData, OrderEvent, RefundRequestedData, StatusChangedData};
pub use state::OrderStatus;
pub use value_objects::{
    AggregateTotals, BuyerSnapshot, CartItem, PaymentInfo, PaymentStatus, SelectedVariant,
    ShippingAddress, StatusEntry, TrackingInfo,
};

use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Checkout with no line items.
    #[error("Cart is empty")]
    EmptyCart,

    /// Invalid quantity.
    #[error("Invalid quantity for {product_id}: {quantity} (must be greater than 0)")]
    InvalidQuantity { product_id: String, quantity: u32 },

    /// Invalid unit price.
    #[error("Invalid price for {product_id}: {price}")]
    InvalidPrice { product_id: String, price: f64 },

    /// Invalid cart-wide charge.
    #[error("Invalid {field}: {amount}")]
    InvalidAmount { field: &'static str, amount: f64 },

    /// Status name not recognised.
    #[error("Unknown order status: {0}")]
    UnknownStatus(String),

    /// Refund request asked for a status outside the refund track.
    #[error("{0} is not a refund status")]
    NotARefundStatus(OrderStatus),

    /// Target status is not reachable from the current one.
    #[error("Invalid state transition: cannot move from {from} to {to}")]
    IllegalTransition { from: OrderStatus, to: OrderStatus },

    /// Operation not allowed because the order already finished.
    #[error("Cannot {action} an order in {status} state")]
    AlreadyTerminal {
        status: OrderStatus,
        action: &'static str,
    },
}

impl OrderError {
    /// Returns true for malformed input, as opposed to a rejected transition.
    pub fn is_invalid_request(&self) -> bool {
        !matches!(
            self,
            OrderError::IllegalTransition { .. } | OrderError::AlreadyTerminal { .. }
        )
    }
}
