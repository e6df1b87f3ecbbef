//! Seller order: one per seller per checkout.

use chrono::{DateTime, Utc};
use common::{OrderId, SellerRef};
use serde::{Deserialize, Serialize};

use super::{
    BuyerSnapshot, CartItem, OrderError, OrderEvent, OrderStatus, PaymentInfo, PaymentStatus,
    ShippingAddress, StatusEntry,
    events::{OrderCancelledData, RefundRequestedData, StatusChangedData},
};
use crate::pricing::SellerAllocation;

/// Everything needed to place one seller order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub id: OrderId,
    pub order_number: String,
    pub seller: SellerRef,
    pub shop_name: String,
    pub cart: Vec<CartItem>,
    pub shipping_address: ShippingAddress,
    pub user: BuyerSnapshot,
    pub payment_info: PaymentInfo,
    pub pricing: SellerAllocation,
    pub placed_at: DateTime<Utc>,
}

/// A seller-scoped order.
///
/// Address, buyer and seller details are snapshots taken at checkout and
/// never re-read. Monetary fields are fixed at placement. Status changes
/// only through the command methods, each of which appends one entry to
/// `status_history`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    order_number: String,
    cart: Vec<CartItem>,
    shipping_address: ShippingAddress,
    user: BuyerSnapshot,
    seller: SellerRef,
    shop_name: String,

    total_price: f64,
    sub_total_price: f64,
    shipping_price: f64,
    discount_price: f64,
    tax: f64,

    status: OrderStatus,
    status_history: Vec<StatusEntry>,
    payment_info: PaymentInfo,

    tracking_number: Option<String>,
    courier_partner: Option<String>,
    estimated_delivery: Option<DateTime<Utc>>,
    delivered_at: Option<DateTime<Utc>>,
    cancelled_at: Option<DateTime<Utc>>,
    cancellation_reason: Option<String>,

    /// Set once the seller wallet has received this order's proceeds.
    seller_credited_at: Option<DateTime<Utc>>,

    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Order {
    /// Places a new order in `Processing` with its first history entry.
    pub fn place(new: NewOrder) -> Result<Self, OrderError> {
        if new.cart.is_empty() {
            return Err(OrderError::EmptyCart);
        }
        for item in &new.cart {
            item.validate()?;
        }

        let status = OrderStatus::Processing;
        Ok(Self {
            id: new.id,
            order_number: new.order_number,
            cart: new.cart,
            shipping_address: new.shipping_address,
            user: new.user,
            seller: new.seller,
            shop_name: new.shop_name,
            total_price: new.pricing.total,
            sub_total_price: new.pricing.sub_total,
            shipping_price: new.pricing.shipping,
            discount_price: new.pricing.discount,
            tax: new.pricing.tax,
            status,
            status_history: vec![StatusEntry {
                status,
                timestamp: new.placed_at,
                note: status.default_note().to_string(),
            }],
            payment_info: new.payment_info,
            tracking_number: None,
            courier_partner: None,
            estimated_delivery: None,
            delivered_at: None,
            cancelled_at: None,
            cancellation_reason: None,
            seller_credited_at: None,
            created_at: new.placed_at,
            updated_at: new.placed_at,
        })
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn order_number(&self) -> &str {
        &self.order_number
    }

    pub fn cart(&self) -> &[CartItem] {
        &self.cart
    }

    pub fn shipping_address(&self) -> &ShippingAddress {
        &self.shipping_address
    }

    pub fn user(&self) -> &BuyerSnapshot {
        &self.user
    }

    pub fn seller(&self) -> &SellerRef {
        &self.seller
    }

    pub fn shop_name(&self) -> &str {
        &self.shop_name
    }

    pub fn total_price(&self) -> f64 {
        self.total_price
    }

    pub fn sub_total_price(&self) -> f64 {
        self.sub_total_price
    }

    pub fn shipping_price(&self) -> f64 {
        self.shipping_price
    }

    pub fn discount_price(&self) -> f64 {
        self.discount_price
    }

    pub fn tax(&self) -> f64 {
        self.tax
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn status_history(&self) -> &[StatusEntry] {
        &self.status_history
    }

    pub fn payment_info(&self) -> &PaymentInfo {
        &self.payment_info
    }

    pub fn tracking_number(&self) -> Option<&str> {
        self.tracking_number.as_deref()
    }

    pub fn courier_partner(&self) -> Option<&str> {
        self.courier_partner.as_deref()
    }

    pub fn estimated_delivery(&self) -> Option<DateTime<Utc>> {
        self.estimated_delivery
    }

    pub fn delivered_at(&self) -> Option<DateTime<Utc>> {
        self.delivered_at
    }

    pub fn cancelled_at(&self) -> Option<DateTime<Utc>> {
        self.cancelled_at
    }

    pub fn cancellation_reason(&self) -> Option<&str> {
        self.cancellation_reason.as_deref()
    }

    pub fn seller_credited_at(&self) -> Option<DateTime<Utc>> {
        self.seller_credited_at
    }

    /// Returns true once the seller wallet has been credited for this order.
    pub fn is_seller_credited(&self) -> bool {
        self.seller_credited_at.is_some()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Total number of units across all line items.
    pub fn total_quantity(&self) -> u64 {
        self.cart.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Returns true if the order is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

// Command methods (return events)
impl Order {
    /// Generic status update.
    ///
    /// `Cancelled` is routed to [`Order::cancel`] with the note as reason,
    /// and `Processing refund` to [`Order::request_refund`].
    pub fn change_status(
        &self,
        to: OrderStatus,
        note: Option<String>,
        tracking: Option<super::TrackingInfo>,
        now: DateTime<Utc>,
    ) -> Result<OrderEvent, OrderError> {
        match to {
            OrderStatus::Cancelled => self.cancel(note, now),
            OrderStatus::ProcessingRefund => self.request_refund(to, now),
            _ => {
                if !self.status.can_transition_to(to) {
                    return Err(OrderError::IllegalTransition {
                        from: self.status,
                        to,
                    });
                }
                Ok(OrderEvent::status_changed(to, note, tracking, now))
            }
        }
    }

    /// Buyer-initiated refund request.
    pub fn request_refund(
        &self,
        requested: OrderStatus,
        now: DateTime<Utc>,
    ) -> Result<OrderEvent, OrderError> {
        if !requested.is_refund_request() {
            return Err(OrderError::NotARefundStatus(requested));
        }
        if !self.status.can_request_refund() {
            return Err(OrderError::IllegalTransition {
                from: self.status,
                to: requested,
            });
        }

        Ok(OrderEvent::refund_requested(requested, now))
    }

    /// Seller confirmation that the refund was paid out.
    pub fn confirm_refund(&self, now: DateTime<Utc>) -> Result<OrderEvent, OrderError> {
        self.change_status(OrderStatus::RefundSuccess, None, None, now)
    }

    /// Cancels the order. Rejected once delivered, cancelled or on the refund track.
    pub fn cancel(
        &self,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<OrderEvent, OrderError> {
        if !self.status.can_cancel() {
            return Err(OrderError::AlreadyTerminal {
                status: self.status,
                action: "cancel",
            });
        }

        Ok(OrderEvent::order_cancelled(reason, now))
    }

    /// Records that the seller wallet received this order's proceeds.
    pub fn mark_seller_credited(&mut self, at: DateTime<Utc>) {
        if self.seller_credited_at.is_none() {
            self.seller_credited_at = Some(at);
            self.updated_at = at;
        }
    }
}

// Apply event helpers
impl Order {
    /// Applies an event, appending one history entry.
    pub fn apply(&mut self, event: OrderEvent) {
        match event {
            OrderEvent::StatusChanged(data) => self.apply_status_changed(data),
            OrderEvent::OrderCancelled(data) => self.apply_order_cancelled(data),
            OrderEvent::RefundRequested(data) => self.apply_refund_requested(data),
        }
    }

    fn push_history(&mut self, status: OrderStatus, note: String, timestamp: DateTime<Utc>) {
        self.status = status;
        self.status_history.push(StatusEntry {
            status,
            timestamp,
            note,
        });
        self.updated_at = timestamp;
    }

    fn apply_status_changed(&mut self, data: StatusChangedData) {
        if let Some(tracking) = data.tracking {
            if tracking.tracking_number.is_some() {
                self.tracking_number = tracking.tracking_number;
            }
            if tracking.courier_partner.is_some() {
                self.courier_partner = tracking.courier_partner;
            }
            if tracking.estimated_delivery.is_some() {
                self.estimated_delivery = tracking.estimated_delivery;
            }
        }

        if data.status == OrderStatus::Delivered {
            self.delivered_at = Some(data.timestamp);
            self.payment_info.status = PaymentStatus::Succeeded;
        }

        self.push_history(data.status, data.note, data.timestamp);
    }

    fn apply_order_cancelled(&mut self, data: OrderCancelledData) {
        self.cancelled_at = Some(data.timestamp);
        self.cancellation_reason = Some(data.reason.clone());
        self.push_history(OrderStatus::Cancelled, data.reason, data.timestamp);
    }

    fn apply_refund_requested(&mut self, data: RefundRequestedData) {
        self.push_history(
            data.status,
            data.status.default_note().to_string(),
            data.timestamp,
        );
    }
}
