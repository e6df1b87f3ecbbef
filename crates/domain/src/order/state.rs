//! Order status state machine.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::OrderError;

/// The status of a seller order in its lifecycle.
///
/// State transitions:
/// ```text
/// Processing ──► Transferred to delivery partner ──► Shipping ──► Received ──► On the way ──► Delivered
///     │                    │                           │             │             │              │
///     └────────────────────┴───────────────────────────┴─────────────┴─────────────┴──► Cancelled │
///                                                                                                 ▼
///                                                            Refund Success ◄── Processing refund
/// ```
///
/// Forward moves along the fulfillment progression may skip steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    /// Order placed, seller has not handed it over yet.
    #[default]
    Processing,

    /// Handed to the courier; stock is deducted on entry.
    #[serde(rename = "Transferred to delivery partner")]
    TransferredToDeliveryPartner,

    Shipping,

    /// Received at the courier's local hub.
    Received,

    #[serde(rename = "On the way")]
    OnTheWay,

    /// Delivered to the buyer (terminal for fulfillment and cancellation).
    Delivered,

    /// Buyer asked for a refund; waiting on the seller.
    #[serde(rename = "Processing refund")]
    ProcessingRefund,

    /// Refund settled (terminal state).
    #[serde(rename = "Refund Success")]
    RefundSuccess,

    /// Order was cancelled (terminal state).
    Cancelled,
}

impl OrderStatus {
    /// All statuses in display order.
    pub const ALL: [OrderStatus; 9] = [
        OrderStatus::Processing,
        OrderStatus::TransferredToDeliveryPartner,
        OrderStatus::Shipping,
        OrderStatus::Received,
        OrderStatus::OnTheWay,
        OrderStatus::Delivered,
        OrderStatus::ProcessingRefund,
        OrderStatus::RefundSuccess,
        OrderStatus::Cancelled,
    ];

    /// Position on the fulfillment progression, `None` off that path.
    fn progression_rank(&self) -> Option<u8> {
        match self {
            OrderStatus::Processing => Some(0),
            OrderStatus::TransferredToDeliveryPartner => Some(1),
            OrderStatus::Shipping => Some(2),
            OrderStatus::Received => Some(3),
            OrderStatus::OnTheWay => Some(4),
            OrderStatus::Delivered => Some(5),
            _ => None,
        }
    }

    /// Returns true if this is a terminal state (no further fulfillment possible).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Delivered | OrderStatus::Cancelled | OrderStatus::RefundSuccess
        )
    }

    /// Returns true while the order's units are out of stock: from the
    /// courier handover (or any later fulfillment step reached by skipping)
    /// until the order is cancelled or the refund settles.
    pub fn holds_stock(&self) -> bool {
        match self.progression_rank() {
            Some(rank) => rank >= 1,
            None => *self == OrderStatus::ProcessingRefund,
        }
    }

    /// Returns true if the order can be cancelled in this state.
    ///
    /// Refund-track orders were already delivered and cannot be cancelled.
    pub fn can_cancel(&self) -> bool {
        self.progression_rank().is_some() && *self != OrderStatus::Delivered
    }

    /// Returns true if a buyer refund request is accepted in this state.
    pub fn can_request_refund(&self) -> bool {
        matches!(self, OrderStatus::Delivered)
    }

    /// Returns true for statuses a buyer refund request may ask for.
    pub fn is_refund_request(&self) -> bool {
        matches!(self, OrderStatus::ProcessingRefund)
    }

    /// Returns true if a generic status update may move from `self` to `next`.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        match (self.progression_rank(), next.progression_rank()) {
            (Some(from), Some(to)) => to > from,
            _ => match next {
                OrderStatus::Cancelled => self.can_cancel(),
                OrderStatus::ProcessingRefund => self.can_request_refund(),
                OrderStatus::RefundSuccess => *self == OrderStatus::ProcessingRefund,
                _ => false,
            },
        }
    }

    /// Statuses reachable from this one by a generic update.
    pub fn next_statuses(&self) -> Vec<OrderStatus> {
        Self::ALL
            .into_iter()
            .filter(|next| self.can_transition_to(*next))
            .collect()
    }

    /// History note used when the caller supplies none.
    pub fn default_note(&self) -> &'static str {
        match self {
            OrderStatus::Processing => "Order placed and is being processed",
            OrderStatus::TransferredToDeliveryPartner => {
                "Order handed over to the delivery partner"
            }
            OrderStatus::Shipping => "Order is being shipped",
            OrderStatus::Received => "Order received at the delivery hub",
            OrderStatus::OnTheWay => "Order is out for delivery",
            OrderStatus::Delivered => "Order delivered",
            OrderStatus::ProcessingRefund => "Refund requested by the buyer",
            OrderStatus::RefundSuccess => "Refund completed",
            OrderStatus::Cancelled => "Cancelled by admin",
        }
    }

    /// Returns the status name as shown to users.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Processing => "Processing",
            OrderStatus::TransferredToDeliveryPartner => "Transferred to delivery partner",
            OrderStatus::Shipping => "Shipping",
            OrderStatus::Received => "Received",
            OrderStatus::OnTheWay => "On the way",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::ProcessingRefund => "Processing refund",
            OrderStatus::RefundSuccess => "Refund Success",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| OrderError::UnknownStatus(s.to_string()))
    }
}
