//! Order lifecycle events.
//!
//! Each successful command yields exactly one event, and applying it
//! appends exactly one status history entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{OrderStatus, TrackingInfo};

/// Events that change an order after it was placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum OrderEvent {
    /// Status moved along the fulfillment or refund path.
    StatusChanged(StatusChangedData),

    /// Order was cancelled.
    OrderCancelled(OrderCancelledData),

    /// Buyer asked for a refund.
    RefundRequested(RefundRequestedData),
}

impl OrderEvent {
    /// Returns the event type name.
    pub fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::StatusChanged(_) => "StatusChanged",
            OrderEvent::OrderCancelled(_) => "OrderCancelled",
            OrderEvent::RefundRequested(_) => "RefundRequested",
        }
    }

    /// Status the order is in after this event.
    pub fn status(&self) -> OrderStatus {
        match self {
            OrderEvent::StatusChanged(data) => data.status,
            OrderEvent::OrderCancelled(_) => OrderStatus::Cancelled,
            OrderEvent::RefundRequested(data) => data.status,
        }
    }

    /// When the event happened.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            OrderEvent::StatusChanged(data) => data.timestamp,
            OrderEvent::OrderCancelled(data) => data.timestamp,
            OrderEvent::RefundRequested(data) => data.timestamp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusChangedData {
    pub status: OrderStatus,
    pub note: String,
    pub tracking: Option<TrackingInfo>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCancelledData {
    pub reason: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundRequestedData {
    pub status: OrderStatus,
    pub timestamp: DateTime<Utc>,
}

// Convenience constructors for events
impl OrderEvent {
    pub fn status_changed(
        status: OrderStatus,
        note: Option<String>,
        tracking: Option<TrackingInfo>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        OrderEvent::StatusChanged(StatusChangedData {
            status,
            note: note
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| status.default_note().to_string()),
            tracking: tracking.filter(|t| !t.is_empty()),
            timestamp,
        })
    }

    pub fn order_cancelled(reason: Option<String>, timestamp: DateTime<Utc>) -> Self {
        OrderEvent::OrderCancelled(OrderCancelledData {
            reason: reason
                .filter(|r| !r.trim().is_empty())
                .unwrap_or_else(|| OrderStatus::Cancelled.default_note().to_string()),
            timestamp,
        })
    }

    pub fn refund_requested(status: OrderStatus, timestamp: DateTime<Utc>) -> Self {
        OrderEvent::RefundRequested(RefundRequestedData { status, timestamp })
    }
}
