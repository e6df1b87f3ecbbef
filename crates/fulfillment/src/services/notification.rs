//! Notification service trait and in-memory implementation.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use common::{OrderId, ShopId, UserId};
use serde::{Deserialize, Serialize};

use crate::error::FulfillmentError;

/// What an order notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Buyer-facing: the order was placed.
    OrderPlaced,
    /// Seller-facing: a new order arrived.
    NewOrder,
    StatusChanged,
    OrderCancelled,
    RefundRequested,
    RefundConfirmed,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::OrderPlaced => "order_placed",
            NotificationKind::NewOrder => "new_order",
            NotificationKind::StatusChanged => "status_changed",
            NotificationKind::OrderCancelled => "order_cancelled",
            NotificationKind::RefundRequested => "refund_requested",
            NotificationKind::RefundConfirmed => "refund_confirmed",
        }
    }
}

/// Who receives a notification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum Recipient {
    User(UserId),
    Shop(ShopId),
    Admin,
}

/// An order notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderNotification {
    pub title: String,
    pub body: String,
    pub kind: NotificationKind,
    pub order_id: OrderId,
    pub user_id: UserId,
    pub recipients: Vec<Recipient>,
}

/// Trait for dispatching order notifications.
#[async_trait]
pub trait NotificationService: Send + Sync {
    async fn notify(&self, notification: OrderNotification) -> Result<(), FulfillmentError>;
}

#[derive(Debug, Default)]
struct InMemoryNotificationState {
    sent: Vec<OrderNotification>,
    fail_on_notify: bool,
}

/// In-memory notification service for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotificationService {
    state: Arc<Mutex<InMemoryNotificationState>>,
}

impl InMemoryNotificationService {
    /// Creates a new in-memory notification service.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, InMemoryNotificationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Configures the service to fail every notify call.
    pub fn set_fail_on_notify(&self, fail: bool) {
        self.lock().fail_on_notify = fail;
    }

    /// Returns the number of notifications delivered.
    pub fn sent_count(&self) -> usize {
        self.lock().sent.len()
    }

    /// Returns a copy of every notification delivered.
    pub fn sent(&self) -> Vec<OrderNotification> {
        self.lock().sent.clone()
    }

    /// Returns the notifications of one kind.
    pub fn sent_of_kind(&self, kind: NotificationKind) -> Vec<OrderNotification> {
        self.lock()
            .sent
            .iter()
            .filter(|n| n.kind == kind)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl NotificationService for InMemoryNotificationService {
    async fn notify(&self, notification: OrderNotification) -> Result<(), FulfillmentError> {
        let mut state = self.lock();

        if state.fail_on_notify {
            return Err(FulfillmentError::Notification(
                "notification service unavailable".to_string(),
            ));
        }

        state.sent.push(notification);
        Ok(())
    }
}
