//! Outbound collaborators and in-memory implementations.

pub mod email;
pub mod notification;

pub use email::{Email, EmailSender, InMemoryEmailSender};
pub use notification::{
    InMemoryNotificationService, NotificationKind, NotificationService, OrderNotification,
    Recipient,
};
