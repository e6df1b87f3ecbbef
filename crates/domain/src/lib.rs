//! Order core for a multi-vendor marketplace.
//!
//! Pure logic only, no I/O:
//! - Seller order model with its status state machine
//! - Cart partitioning by seller
//! - Proportional allocation of shipping, discount and tax
//! - Payment classification and seller settlement decisions

pub mod checkout;
pub mod order;
pub mod partition;
pub mod payment;
pub mod pricing;
pub mod settlement;

pub use checkout::{SellerShare, plan_checkout};
pub use order::{
    AggregateTotals, BuyerSnapshot, CartItem, NewOrder, Order, OrderError, OrderEvent,
    OrderStatus, PaymentInfo, PaymentStatus, SelectedVariant, ShippingAddress, StatusEntry,
    TrackingInfo,
};
pub use partition::{SellerGroup, partition_by_seller};
pub use payment::PaymentKind;
pub use pricing::{SellerAllocation, allocate, cart_value};
pub use settlement::{
    SERVICE_CHARGE_RATE, SettlementDecision, SettlementPhase, SkipReason, WalletCredit,
};
