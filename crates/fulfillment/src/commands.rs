//! Inputs of the coordinator's write operations.

use domain::{
    AggregateTotals, BuyerSnapshot, CartItem, OrderStatus, PaymentInfo, ShippingAddress,
    TrackingInfo,
};
use serde::{Deserialize, Serialize};

/// Checkout of a combined cart that may span several sellers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceOrder {
    pub cart: Vec<CartItem>,
    pub shipping_address: ShippingAddress,
    pub user: BuyerSnapshot,
    pub payment_info: PaymentInfo,
    #[serde(default)]
    pub totals: AggregateTotals,
}

/// Generic status update requested by a seller or admin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub tracking: Option<TrackingInfo>,
}

impl StatusUpdate {
    pub fn new(status: OrderStatus) -> Self {
        Self {
            status,
            note: None,
            tracking: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_tracking(mut self, tracking: TrackingInfo) -> Self {
        self.tracking = Some(tracking);
        self
    }
}
