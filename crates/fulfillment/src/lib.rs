//! Order fulfillment for a multi-vendor marketplace.
//!
//! The [`OrderCoordinator`] splits a checkout into seller orders and then
//! drives each one through its status lifecycle:
//!
//! 1. Place one order per seller, crediting prepaid sellers at once
//! 2. Hand over to the courier, deducting stock
//! 3. Deliver, crediting cash-on-delivery sellers
//! 4. Cancel or refund, restoring stock
//!
//! Notification, email and wallet failures never abort an operation; they
//! are reported in the returned [`SideEffects`].

pub mod commands;
pub mod coordinator;
pub mod effects;
pub mod emails;
pub mod error;
pub mod services;
pub mod settlement;

pub use commands::{PlaceOrder, StatusUpdate};
pub use coordinator::{
    CoordinatorConfig, DEFAULT_ORDER_NUMBER_PREFIX, ORDER_SEQUENCE, OrderCoordinator,
};
pub use effects::{AppliedCredit, LifecycleResult, SideEffects};
pub use error::{FulfillmentError, Result};
pub use services::{
    Email, EmailSender, InMemoryEmailSender, InMemoryNotificationService, NotificationKind,
    NotificationService, OrderNotification, Recipient,
};
pub use settlement::SettlementEngine;
