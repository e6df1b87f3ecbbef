//! Settlement execution: turns a settlement decision into a wallet credit.

use chrono::{DateTime, Utc};
use domain::{
    Order, SERVICE_CHARGE_RATE, SettlementDecision, SettlementPhase,
    settlement::decide,
};
use store::ShopRepository;

use crate::effects::AppliedCredit;
use crate::error::FulfillmentError;

/// Credits seller wallets net of the platform service charge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettlementEngine {
    service_charge_rate: f64,
}

impl Default for SettlementEngine {
    fn default() -> Self {
        Self::new(SERVICE_CHARGE_RATE)
    }
}

impl SettlementEngine {
    pub fn new(service_charge_rate: f64) -> Self {
        Self {
            service_charge_rate,
        }
    }

    pub fn service_charge_rate(&self) -> f64 {
        self.service_charge_rate
    }

    /// Settles `order` for `phase`.
    ///
    /// Returns `Ok(None)` when no credit is due. On a successful credit the
    /// order is marked as credited; the caller persists it. Any credit
    /// failure comes back as `FulfillmentError::Settlement` and leaves the
    /// order untouched.
    #[tracing::instrument(skip(self, shops, order, now), fields(order_id = %order.id()))]
    pub async fn settle<R>(
        &self,
        shops: &R,
        order: &mut Order,
        phase: SettlementPhase,
        now: DateTime<Utc>,
    ) -> Result<Option<AppliedCredit>, FulfillmentError>
    where
        R: ShopRepository + ?Sized,
    {
        let credit = match decide(order, phase, self.service_charge_rate) {
            SettlementDecision::Credit(credit) => credit,
            SettlementDecision::Skip(reason) => {
                tracing::debug!(?reason, "no wallet credit due");
                return Ok(None);
            }
        };

        let shop = shops
            .credit_balance(&credit.shop_id, credit.amount)
            .await
            .map_err(|e| {
                FulfillmentError::Settlement(format!(
                    "could not credit {} for order {}: {}",
                    credit.shop_id,
                    order.order_number(),
                    e
                ))
            })?;

        order.mark_seller_credited(now);

        metrics::counter!("seller_wallet_credits_total", "phase" => phase.as_str()).increment(1);
        tracing::info!(
            shop_id = %credit.shop_id,
            amount = credit.amount,
            new_balance = shop.available_balance,
            "seller wallet credited"
        );

        Ok(Some(AppliedCredit {
            shop_id: credit.shop_id,
            amount: credit.amount,
            new_balance: shop.available_balance,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{OrderId, SellerRef, ShopId, UserId};
    use domain::{
        BuyerSnapshot, CartItem, NewOrder, OrderStatus, PaymentInfo, PaymentStatus,
        SellerAllocation, ShippingAddress,
    };
    use store::{InMemoryStore, Shop};

    fn order(seller: &str, method: &str) -> Order {
        Order::place(NewOrder {
            id: OrderId::new(),
            order_number: "wanttar-00001".to_string(),
            seller: SellerRef::from(seller),
            shop_name: seller.to_string(),
            cart: vec![CartItem::new("SKU-1", "Lamp", 1, 115.0, seller)],
            shipping_address: ShippingAddress::default(),
            user: BuyerSnapshot {
                id: UserId::new("user-1"),
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                phone: None,
            },
            payment_info: PaymentInfo::new(None, PaymentStatus::Pending, method),
            pricing: SellerAllocation {
                sub_total: 115.0,
                total: 115.0,
                ..Default::default()
            },
            placed_at: Utc::now(),
        })
        .unwrap()
    }

    async fn store_with_shop() -> InMemoryStore {
        let store = InMemoryStore::new();
        store.upsert_shop(Shop::new("shop-a", "Shop A")).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_prepaid_credits_once_at_creation() {
        let store = store_with_shop().await;
        let engine = SettlementEngine::default();
        let mut order = order("shop-a", "Credit Card");

        let credit = engine
            .settle(&store, &mut order, SettlementPhase::OnCreation, Utc::now())
            .await
            .unwrap()
            .unwrap();
        assert!((credit.amount - 103.5).abs() < 1e-9);
        assert!((credit.new_balance - 103.5).abs() < 1e-9);
        assert!(order.is_seller_credited());

        let again = engine
            .settle(&store, &mut order, SettlementPhase::OnCreation, Utc::now())
            .await
            .unwrap();
        assert!(again.is_none());
    }

    #[tokio::test]
    async fn test_cod_waits_for_delivery() {
        let store = store_with_shop().await;
        let engine = SettlementEngine::default();
        let mut order = order("shop-a", "cod");

        let at_creation = engine
            .settle(&store, &mut order, SettlementPhase::OnCreation, Utc::now())
            .await
            .unwrap();
        assert!(at_creation.is_none());

        let event = order
            .change_status(OrderStatus::Delivered, None, None, Utc::now())
            .unwrap();
        order.apply(event);

        let at_delivery = engine
            .settle(&store, &mut order, SettlementPhase::OnDelivery, Utc::now())
            .await
            .unwrap();
        assert!(at_delivery.is_some());
    }

    #[tokio::test]
    async fn test_missing_shop_is_settlement_error() {
        let store = InMemoryStore::new();
        let engine = SettlementEngine::default();
        let mut order = order("shop-a", "Credit Card");

        let err = engine
            .settle(&store, &mut order, SettlementPhase::OnCreation, Utc::now())
            .await
            .unwrap_err();

        assert!(matches!(err, FulfillmentError::Settlement(_)));
        assert!(!order.is_seller_credited());
    }

    #[tokio::test]
    async fn test_custom_rate() {
        let store = store_with_shop().await;
        let engine = SettlementEngine::new(0.2);
        let mut order = order("shop-a", "Credit Card");

        engine
            .settle(&store, &mut order, SettlementPhase::OnCreation, Utc::now())
            .await
            .unwrap();

        let shop = store.find_shop(&ShopId::new("shop-a")).await.unwrap().unwrap();
        assert!((shop.available_balance - 92.0).abs() < 1e-9);
    }
}
