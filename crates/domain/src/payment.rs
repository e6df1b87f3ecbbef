//! Payment method classification.

use serde::{Deserialize, Serialize};

/// Declared payment types that mean "collect cash at the door".
///
/// Compared case-insensitively after trimming.
pub const COD_SYNONYMS: &[&str] = &[
    "cod",
    "cash on delivery",
    "cash-on-delivery",
    "cash_on_delivery",
    "cashondelivery",
    "cash",
    "pay on delivery",
];

/// How the seller gets paid for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentKind {
    /// Paid through an online gateway before fulfillment.
    #[default]
    Prepaid,

    /// Paid to the courier at delivery.
    CashOnDelivery,
}

impl PaymentKind {
    /// Classifies a declared payment type.
    pub fn classify(method: &str) -> Self {
        let method = method.trim();
        if COD_SYNONYMS
            .iter()
            .any(|synonym| synonym.eq_ignore_ascii_case(method))
        {
            PaymentKind::CashOnDelivery
        } else {
            PaymentKind::Prepaid
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentKind::Prepaid => "Prepaid",
            PaymentKind::CashOnDelivery => "CashOnDelivery",
        }
    }
}

impl std::fmt::Display for PaymentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
