//! Fulfillment error types.

use domain::OrderError;
use store::StoreError;
use thiserror::Error;

/// Errors that can occur during order lifecycle operations.
///
/// `Notification`, `Email` and `Settlement` come from collaborators. The
/// coordinator logs them and records them in the operation's side-effect
/// report; they never fail a request.
#[derive(Debug, Error)]
pub enum FulfillmentError {
    /// A referenced order, product or shop does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Malformed input; nothing was written.
    #[error("Invalid request: {0}")]
    InvalidRequest(OrderError),

    /// The order's current status does not allow the operation.
    #[error("Illegal transition: {0}")]
    IllegalTransition(OrderError),

    /// Storage failure.
    #[error("Store error: {0}")]
    Store(StoreError),

    /// Notification dispatch failed.
    #[error("Notification failed: {0}")]
    Notification(String),

    /// Email dispatch failed.
    #[error("Email failed: {0}")]
    Email(String),

    /// Seller wallet credit failed.
    #[error("Settlement failed: {0}")]
    Settlement(String),
}

impl FulfillmentError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, FulfillmentError::NotFound { .. })
    }

    /// Returns the metric label of a soft failure, if this is one.
    pub fn soft_kind(&self) -> Option<&'static str> {
        match self {
            FulfillmentError::Notification(_) => Some("notification"),
            FulfillmentError::Email(_) => Some("email"),
            FulfillmentError::Settlement(_) => Some("settlement"),
            _ => None,
        }
    }
}

impl From<OrderError> for FulfillmentError {
    fn from(err: OrderError) -> Self {
        if err.is_invalid_request() {
            FulfillmentError::InvalidRequest(err)
        } else {
            FulfillmentError::IllegalTransition(err)
        }
    }
}

impl From<StoreError> for FulfillmentError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => FulfillmentError::NotFound { entity, id },
            other => FulfillmentError::Store(other),
        }
    }
}

/// Convenience type alias for fulfillment results.
pub type Result<T> = std::result::Result<T, FulfillmentError>;

#[cfg(test)]
mod tests {
    use super::*;
    use domain::OrderStatus;

    #[test]
    fn test_order_errors_are_classified() {
        let invalid: FulfillmentError = OrderError::EmptyCart.into();
        assert!(matches!(invalid, FulfillmentError::InvalidRequest(_)));

        let illegal: FulfillmentError = OrderError::AlreadyTerminal {
            status: OrderStatus::Delivered,
            action: "cancel",
        }
        .into();
        assert!(matches!(illegal, FulfillmentError::IllegalTransition(_)));
    }

    #[test]
    fn test_store_not_found_is_lifted() {
        let err: FulfillmentError = StoreError::not_found("Product", "SKU-1").into();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Product not found: SKU-1");
    }

    #[test]
    fn test_soft_kinds() {
        assert_eq!(
            FulfillmentError::Email("smtp down".into()).soft_kind(),
            Some("email")
        );
        assert_eq!(
            FulfillmentError::NotFound {
                entity: "Order",
                id: "x".into()
            }
            .soft_kind(),
            None
        );
    }
}
