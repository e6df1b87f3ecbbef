//! Seller settlement decisions.
//!
//! Decides whether and how much to credit a seller wallet for an order.
//! Prepaid orders settle when placed, cash-on-delivery orders when
//! delivered, and no order settles twice.

use common::ShopId;
use serde::{Deserialize, Serialize};

use crate::order::{Order, OrderStatus};
use crate::payment::PaymentKind;

/// Platform fee deducted from seller proceeds.
pub const SERVICE_CHARGE_RATE: f64 = 0.10;

/// Point in the order lifecycle at which settlement is attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SettlementPhase {
    OnCreation,
    OnDelivery,
}

impl SettlementPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SettlementPhase::OnCreation => "on_creation",
            SettlementPhase::OnDelivery => "on_delivery",
        }
    }
}

impl std::fmt::Display for SettlementPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why no credit is due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// Platform catalog order, no wallet exists.
    PlatformSeller,
    /// Wallet already received this order's proceeds.
    AlreadyCredited,
    /// Cash-on-delivery orders settle at delivery.
    AwaitingDelivery,
    /// Prepaid orders settle at creation only.
    SettledAtCreation,
    /// Delivery-phase settlement requested for an order not delivered.
    NotDelivered,
}

/// A credit owed to a seller wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletCredit {
    pub shop_id: ShopId,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SettlementDecision {
    Credit(WalletCredit),
    Skip(SkipReason),
}

/// Seller proceeds after the platform fee.
pub fn net_proceeds(total_price: f64, service_charge_rate: f64) -> f64 {
    total_price * (1.0 - service_charge_rate)
}

/// Decides the wallet credit for `order` in `phase`.
pub fn decide(
    order: &Order,
    phase: SettlementPhase,
    service_charge_rate: f64,
) -> SettlementDecision {
    let Some(shop_id) = order.seller().shop_id() else {
        return SettlementDecision::Skip(SkipReason::PlatformSeller);
    };

    if order.is_seller_credited() {
        return SettlementDecision::Skip(SkipReason::AlreadyCredited);
    }

    match (order.payment_info().kind, phase) {
        (PaymentKind::Prepaid, SettlementPhase::OnDelivery) => {
            return SettlementDecision::Skip(SkipReason::SettledAtCreation);
        }
        (PaymentKind::CashOnDelivery, SettlementPhase::OnCreation) => {
            return SettlementDecision::Skip(SkipReason::AwaitingDelivery);
        }
        (PaymentKind::CashOnDelivery, SettlementPhase::OnDelivery)
            if order.status() != OrderStatus::Delivered =>
        {
            return SettlementDecision::Skip(SkipReason::NotDelivered);
        }
        _ => {}
    }

    SettlementDecision::Credit(WalletCredit {
        shop_id: shop_id.clone(),
        amount: net_proceeds(order.total_price(), service_charge_rate),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{
        BuyerSnapshot, CartItem, NewOrder, PaymentInfo, PaymentStatus, ShippingAddress,
    };
    use crate::pricing::SellerAllocation;
    use chrono::Utc;
    use common::{OrderId, SellerRef, UserId};

    fn order(seller: &str, method: &str) -> Order {
        Order::place(NewOrder {
            id: OrderId::new(),
            order_number: "wanttar-00001".to_string(),
            seller: SellerRef::from(seller),
            shop_name: seller.to_string(),
            cart: vec![CartItem::new("SKU-1", "Lamp", 1, 100.0, seller)],
            shipping_address: ShippingAddress::default(),
            user: BuyerSnapshot {
                id: UserId::new("u1"),
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                phone: None,
            },
            payment_info: PaymentInfo::new(None, PaymentStatus::Pending, method),
            pricing: SellerAllocation {
                sub_total: 100.0,
                shipping: 15.0,
                discount: 0.0,
                tax: 0.0,
                total: 115.0,
            },
            placed_at: Utc::now(),
        })
        .unwrap()
    }

    fn deliver(order: &mut Order) {
        let event = order
            .change_status(OrderStatus::Delivered, None, None, Utc::now())
            .unwrap();
        order.apply(event);
    }

    #[test]
    fn test_net_proceeds_deducts_service_charge() {
        assert!((net_proceeds(115.0, SERVICE_CHARGE_RATE) - 103.5).abs() < 1e-9);
        assert_eq!(net_proceeds(50.0, 0.0), 50.0);
    }

    #[test]
    fn test_prepaid_credits_on_creation_only() {
        let mut prepaid = order("shop-a", "Credit Card");
        match decide(&prepaid, SettlementPhase::OnCreation, SERVICE_CHARGE_RATE) {
            SettlementDecision::Credit(credit) => {
                assert_eq!(credit.shop_id, ShopId::new("shop-a"));
                assert!((credit.amount - 103.5).abs() < 1e-9);
            }
            other => panic!("expected credit, got {other:?}"),
        }

        deliver(&mut prepaid);
        assert_eq!(
            decide(&prepaid, SettlementPhase::OnDelivery, SERVICE_CHARGE_RATE),
            SettlementDecision::Skip(SkipReason::SettledAtCreation)
        );
    }

    #[test]
    fn test_cod_credits_on_delivery_only() {
        let mut cod = order("shop-a", "COD");
        assert_eq!(
            decide(&cod, SettlementPhase::OnCreation, SERVICE_CHARGE_RATE),
            SettlementDecision::Skip(SkipReason::AwaitingDelivery)
        );
        assert_eq!(
            decide(&cod, SettlementPhase::OnDelivery, SERVICE_CHARGE_RATE),
            SettlementDecision::Skip(SkipReason::NotDelivered)
        );

        deliver(&mut cod);
        assert!(matches!(
            decide(&cod, SettlementPhase::OnDelivery, SERVICE_CHARGE_RATE),
            SettlementDecision::Credit(_)
        ));
    }

    #[test]
    fn test_credited_order_never_credited_again() {
        let mut cod = order("shop-a", "cash on delivery");
        deliver(&mut cod);
        cod.mark_seller_credited(Utc::now());
        assert_eq!(
            decide(&cod, SettlementPhase::OnDelivery, SERVICE_CHARGE_RATE),
            SettlementDecision::Skip(SkipReason::AlreadyCredited)
        );
    }

    #[test]
    fn test_platform_seller_never_credited() {
        let mut prepaid = order("platform", "Credit Card");
        assert_eq!(
            decide(&prepaid, SettlementPhase::OnCreation, SERVICE_CHARGE_RATE),
            SettlementDecision::Skip(SkipReason::PlatformSeller)
        );
        deliver(&mut prepaid);
        assert_eq!(
            decide(&prepaid, SettlementPhase::OnDelivery, SERVICE_CHARGE_RATE),
            SettlementDecision::Skip(SkipReason::PlatformSeller)
        );
    }
}
