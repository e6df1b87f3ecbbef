//! Side-effect reporting for lifecycle operations.
//!
//! Core writes (order, stock) either succeed or fail the operation.
//! Everything else is best-effort and lands here so callers can tell the
//! user what did and did not happen.

use common::ShopId;
use serde::{Deserialize, Serialize};

use crate::error::FulfillmentError;

/// A wallet credit that was applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedCredit {
    pub shop_id: ShopId,
    pub amount: f64,
    pub new_balance: f64,
}

/// What an operation did besides its core writes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SideEffects {
    pub notifications_sent: u32,
    pub notifications_failed: u32,
    pub emails_sent: u32,
    pub emails_failed: u32,
    pub wallet_credits: Vec<AppliedCredit>,
    /// Human-readable soft-failure messages.
    pub warnings: Vec<String>,
}

impl SideEffects {
    /// Returns true if no soft failure was recorded.
    pub fn is_clean(&self) -> bool {
        self.notifications_failed == 0 && self.emails_failed == 0 && self.warnings.is_empty()
    }

    /// Records a swallowed failure: logs it, counts it and keeps the message.
    pub(crate) fn record_failure(&mut self, err: &FulfillmentError) {
        let kind = err.soft_kind().unwrap_or("other");
        tracing::warn!(kind, error = %err, "side effect failed");
        metrics::counter!("side_effect_failures_total", "kind" => kind).increment(1);

        match err {
            FulfillmentError::Notification(_) => self.notifications_failed += 1,
            FulfillmentError::Email(_) => self.emails_failed += 1,
            _ => {}
        }
        self.warnings.push(err.to_string());
    }

    pub(crate) fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(%message, "side effect skipped");
        self.warnings.push(message);
    }
}

/// Outcome of a lifecycle operation: the value plus its side-effect report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifecycleResult<T> {
    pub value: T,
    pub effects: SideEffects,
}

impl<T> LifecycleResult<T> {
    pub fn new(value: T, effects: SideEffects) -> Self {
        Self { value, effects }
    }

    pub fn into_value(self) -> T {
        self.value
    }
}
