//! Order coordinator: checkout and the post-checkout lifecycle.

use std::time::Instant;

use chrono::{DateTime, Utc};
use common::{OrderId, ShopId, UserId};
use domain::{
    NewOrder, Order, OrderEvent, OrderStatus, SERVICE_CHARGE_RATE, SellerShare,
    SettlementPhase, plan_checkout,
};
use store::{MarketplaceStore, StoreExt};

use crate::commands::{PlaceOrder, StatusUpdate};
use crate::effects::{LifecycleResult, SideEffects};
use crate::emails;
use crate::error::{FulfillmentError, Result};
use crate::services::{
    Email, EmailSender, NotificationKind, NotificationService, OrderNotification, Recipient,
};
use crate::settlement::SettlementEngine;

/// Counter backing human-facing order numbers.
pub const ORDER_SEQUENCE: &str = "orders";

/// Default prefix of human-facing order numbers.
pub const DEFAULT_ORDER_NUMBER_PREFIX: &str = "wanttar";

/// Coordinator configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinatorConfig {
    pub order_number_prefix: String,
    /// Platform fee deducted before crediting a seller, in `[0, 1)`.
    pub service_charge_rate: f64,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            order_number_prefix: DEFAULT_ORDER_NUMBER_PREFIX.to_string(),
            service_charge_rate: SERVICE_CHARGE_RATE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StockMove {
    /// Stock leaves the shelf: stock down, sold_out up.
    Deduct,
    /// Stock comes back: stock up, sold_out down.
    Restore,
}

/// Drives seller orders from checkout to a terminal status.
///
/// Order, stock and sequence writes are hard: a failure aborts the
/// operation and is returned. Writes already made are not rolled back.
/// Wallet credits, notifications and emails are soft: failures are logged
/// and reported in the returned [`SideEffects`].
pub struct OrderCoordinator<S, N, E>
where
    S: MarketplaceStore,
    N: NotificationService,
    E: EmailSender,
{
    store: S,
    notifier: N,
    mailer: E,
    settlement: SettlementEngine,
    config: CoordinatorConfig,
}

impl<S, N, E> OrderCoordinator<S, N, E>
where
    S: MarketplaceStore,
    N: NotificationService,
    E: EmailSender,
{
    /// Creates a coordinator with the default configuration.
    pub fn new(store: S, notifier: N, mailer: E) -> Self {
        Self::with_config(store, notifier, mailer, CoordinatorConfig::default())
    }

    pub fn with_config(store: S, notifier: N, mailer: E, config: CoordinatorConfig) -> Self {
        Self {
            store,
            notifier,
            mailer,
            settlement: SettlementEngine::new(config.service_charge_rate),
            config,
        }
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Places one order per seller in the cart.
    ///
    /// Prepaid orders credit their seller immediately. Buyer and seller are
    /// notified per order, and the buyer gets one confirmation email for the
    /// whole checkout.
    #[tracing::instrument(
        skip(self, request),
        fields(items = request.cart.len(), user_id = %request.user.id)
    )]
    pub async fn create_order(&self, request: PlaceOrder) -> Result<LifecycleResult<Vec<Order>>> {
        let started = Instant::now();
        let PlaceOrder {
            cart,
            shipping_address,
            user,
            payment_info,
            totals,
        } = request;

        let shares = plan_checkout(cart, &totals)?;
        let now = Utc::now();
        let mut effects = SideEffects::default();
        let mut orders = Vec::with_capacity(shares.len());

        for SellerShare { group, pricing } in shares {
            let order_number = self.next_order_number().await?;
            let mut order = Order::place(NewOrder {
                id: OrderId::new(),
                order_number,
                seller: group.seller,
                shop_name: group.shop_name,
                cart: group.items,
                shipping_address: shipping_address.clone(),
                user: user.clone(),
                payment_info: payment_info.clone(),
                pricing,
                placed_at: now,
            })?;
            self.store.insert_order(&order).await?;

            if self
                .settle(&mut order, SettlementPhase::OnCreation, now, &mut effects)
                .await
            {
                self.store.save_order(&order).await?;
            }

            tracing::info!(
                order_id = %order.id(),
                order_number = order.order_number(),
                seller = order.seller().as_str(),
                total = order.total_price(),
                "order placed"
            );

            self.notify(placed_notification(&order), &mut effects).await;
            self.notify(new_order_notification(&order), &mut effects)
                .await;
            orders.push(order);
        }

        self.send_email(emails::order_confirmation(&user, &orders), &mut effects)
            .await;

        metrics::counter!("orders_placed_total").increment(orders.len() as u64);
        metrics::histogram!("checkout_duration_seconds").record(started.elapsed().as_secs_f64());

        Ok(LifecycleResult::new(orders, effects))
    }

    /// Generic status update.
    ///
    /// `Cancelled` behaves exactly like [`Self::cancel_order`] with the note
    /// as reason, and `Processing refund` like [`Self::request_refund`].
    #[tracing::instrument(skip(self, update), fields(status = %update.status))]
    pub async fn transition_status(
        &self,
        id: OrderId,
        update: StatusUpdate,
    ) -> Result<LifecycleResult<Order>> {
        let order = self.store.get_order(id).await?;
        let event = order.change_status(update.status, update.note, update.tracking, Utc::now())?;
        self.commit(order, event).await
    }

    /// Buyer-initiated refund request. Moves no money or stock.
    #[tracing::instrument(skip(self))]
    pub async fn request_refund(
        &self,
        id: OrderId,
        requested: OrderStatus,
    ) -> Result<LifecycleResult<Order>> {
        let order = self.store.get_order(id).await?;
        let event = order.request_refund(requested, Utc::now())?;
        self.commit(order, event).await
    }

    /// Seller confirmation that the refund was paid; restores stock.
    #[tracing::instrument(skip(self))]
    pub async fn confirm_refund(&self, id: OrderId) -> Result<LifecycleResult<Order>> {
        let order = self.store.get_order(id).await?;
        let event = order.confirm_refund(Utc::now())?;
        self.commit(order, event).await
    }

    /// Cancels an order. Stock already handed to the courier is restored
    /// for every line item.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_order(
        &self,
        id: OrderId,
        reason: Option<String>,
    ) -> Result<LifecycleResult<Order>> {
        let order = self.store.get_order(id).await?;
        let event = order.cancel(reason, Utc::now())?;
        self.commit(order, event).await
    }

    pub async fn get_order(&self, id: OrderId) -> Result<Order> {
        Ok(self.store.get_order(id).await?)
    }

    /// Orders of one seller, newest first.
    pub async fn orders_for_shop(&self, shop_id: &ShopId) -> Result<Vec<Order>> {
        Ok(self.store.list_orders_by_shop(shop_id).await?)
    }

    /// Orders of one buyer, newest first.
    pub async fn orders_for_user(&self, user_id: &UserId) -> Result<Vec<Order>> {
        Ok(self.store.list_orders_by_user(user_id).await?)
    }

    async fn next_order_number(&self) -> Result<String> {
        let seq = self.store.next_value(ORDER_SEQUENCE).await?;
        Ok(format!("{}-{:05}", self.config.order_number_prefix, seq))
    }

    /// Applies a validated event: stock, status, persistence, settlement,
    /// then notifications.
    ///
    /// Stock is deducted when an order first reaches a status that holds
    /// stock, even if the courier handover step was skipped, and restored
    /// when it leaves one.
    async fn commit(&self, mut order: Order, event: OrderEvent) -> Result<LifecycleResult<Order>> {
        let from = order.status();
        let to = event.status();
        let now = event.timestamp();
        let mut effects = SideEffects::default();

        match (from.holds_stock(), to.holds_stock()) {
            (false, true) => self.move_stock(&order, StockMove::Deduct).await?,
            (true, false) => self.move_stock(&order, StockMove::Restore).await?,
            _ => {}
        }

        order.apply(event);
        self.store.save_order(&order).await?;

        // Delivered is stored before the wallet moves, so a failed write
        // can never be retried into a second credit.
        if to == OrderStatus::Delivered
            && self
                .settle(&mut order, SettlementPhase::OnDelivery, now, &mut effects)
                .await
        {
            self.store.save_order(&order).await?;
        }

        metrics::counter!("order_transitions_total", "status" => to.as_str()).increment(1);
        tracing::info!(
            order_id = %order.id(),
            order_number = order.order_number(),
            %from,
            %to,
            "order status changed"
        );

        self.notify(buyer_status_notification(&order), &mut effects)
            .await;
        match to {
            OrderStatus::Cancelled => {
                self.send_email(emails::cancellation_notice(&order), &mut effects)
                    .await
            }
            OrderStatus::RefundSuccess => {
                self.send_email(emails::refund_confirmation(&order), &mut effects)
                    .await
            }
            OrderStatus::ProcessingRefund => {
                self.notify(refund_requested_notification(&order), &mut effects)
                    .await
            }
            _ => {}
        }

        Ok(LifecycleResult::new(order, effects))
    }

    async fn move_stock(&self, order: &Order, direction: StockMove) -> Result<()> {
        for item in order.cart() {
            let quantity = i64::from(item.quantity);
            let (delta_stock, delta_sold_out) = match direction {
                StockMove::Deduct => (-quantity, quantity),
                StockMove::Restore => (quantity, -quantity),
            };

            let product = self
                .store
                .adjust_stock(&item.product_id, delta_stock, delta_sold_out)
                .await?;
            tracing::debug!(
                product_id = %product.id,
                stock = product.stock,
                sold_out = product.sold_out,
                ?direction,
                "stock adjusted"
            );
        }
        Ok(())
    }

    /// Returns true if the order was credited and needs saving.
    async fn settle(
        &self,
        order: &mut Order,
        phase: SettlementPhase,
        now: DateTime<Utc>,
        effects: &mut SideEffects,
    ) -> bool {
        match self.settlement.settle(&self.store, order, phase, now).await {
            Ok(Some(credit)) => {
                effects.wallet_credits.push(credit);
                true
            }
            Ok(None) => false,
            Err(e) => {
                effects.record_failure(&e);
                false
            }
        }
    }

    async fn notify(&self, notification: OrderNotification, effects: &mut SideEffects) {
        match self.notifier.notify(notification).await {
            Ok(()) => effects.notifications_sent += 1,
            Err(FulfillmentError::Notification(msg)) => {
                effects.record_failure(&FulfillmentError::Notification(msg))
            }
            Err(other) => {
                effects.record_failure(&FulfillmentError::Notification(other.to_string()))
            }
        }
    }

    async fn send_email(&self, email: Email, effects: &mut SideEffects) {
        if email.to.trim().is_empty() {
            effects.warn(format!("no email address for \"{}\"", email.subject));
            return;
        }

        match self.mailer.send(email).await {
            Ok(()) => effects.emails_sent += 1,
            Err(FulfillmentError::Email(msg)) => {
                effects.record_failure(&FulfillmentError::Email(msg))
            }
            Err(other) => effects.record_failure(&FulfillmentError::Email(other.to_string())),
        }
    }
}

fn buyer_recipient(order: &Order) -> Recipient {
    Recipient::User(order.user().id.clone())
}

fn seller_recipient(order: &Order) -> Recipient {
    match order.seller().shop_id() {
        Some(shop_id) => Recipient::Shop(shop_id.clone()),
        None => Recipient::Admin,
    }
}

fn notification(
    order: &Order,
    kind: NotificationKind,
    title: &str,
    body: String,
    recipients: Vec<Recipient>,
) -> OrderNotification {
    OrderNotification {
        title: title.to_string(),
        body,
        kind,
        order_id: order.id(),
        user_id: order.user().id.clone(),
        recipients,
    }
}

fn placed_notification(order: &Order) -> OrderNotification {
    notification(
        order,
        NotificationKind::OrderPlaced,
        "Order placed",
        format!(
            "Your order {} from {} has been placed.",
            order.order_number(),
            order.shop_name()
        ),
        vec![buyer_recipient(order)],
    )
}

fn new_order_notification(order: &Order) -> OrderNotification {
    notification(
        order,
        NotificationKind::NewOrder,
        "New order",
        format!(
            "Order {} received: {} item(s), total {:.2}.",
            order.order_number(),
            order.total_quantity(),
            order.total_price()
        ),
        vec![seller_recipient(order)],
    )
}

fn buyer_status_notification(order: &Order) -> OrderNotification {
    let (kind, title) = match order.status() {
        OrderStatus::Cancelled => (NotificationKind::OrderCancelled, "Order cancelled"),
        OrderStatus::RefundSuccess => (NotificationKind::RefundConfirmed, "Refund completed"),
        _ => (NotificationKind::StatusChanged, "Order status updated"),
    };
    let note = order
        .status_history()
        .last()
        .map(|entry| entry.note.as_str())
        .unwrap_or_default();

    notification(
        order,
        kind,
        title,
        format!(
            "Order {} is now {}. {}",
            order.order_number(),
            order.status(),
            note
        ),
        vec![buyer_recipient(order)],
    )
}

fn refund_requested_notification(order: &Order) -> OrderNotification {
    let mut recipients = vec![seller_recipient(order)];
    if recipients[0] != Recipient::Admin {
        recipients.push(Recipient::Admin);
    }

    notification(
        order,
        NotificationKind::RefundRequested,
        "Refund requested",
        format!(
            "The buyer requested a refund of {:.2} for order {}.",
            order.total_price(),
            order.order_number()
        ),
        recipients,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{InMemoryEmailSender, InMemoryNotificationService};
    use domain::{
        AggregateTotals, BuyerSnapshot, CartItem, PaymentInfo, PaymentStatus, ShippingAddress,
    };
    use store::{InMemoryStore, OrderSequence, Product, ProductRepository};

    type TestCoordinator =
        OrderCoordinator<InMemoryStore, InMemoryNotificationService, InMemoryEmailSender>;

    fn setup(config: CoordinatorConfig) -> (TestCoordinator, InMemoryStore) {
        let store = InMemoryStore::new();
        let coordinator = OrderCoordinator::with_config(
            store.clone(),
            InMemoryNotificationService::new(),
            InMemoryEmailSender::new(),
            config,
        );
        (coordinator, store)
    }

    fn request(cart: Vec<CartItem>) -> PlaceOrder {
        PlaceOrder {
            cart,
            shipping_address: ShippingAddress::default(),
            user: BuyerSnapshot {
                id: UserId::new("user-1"),
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                phone: None,
            },
            payment_info: PaymentInfo::new(None, PaymentStatus::Pending, "COD"),
            totals: AggregateTotals::default(),
        }
    }

    #[tokio::test]
    async fn test_order_numbers_are_prefixed_and_padded() {
        let (coordinator, _) = setup(CoordinatorConfig {
            order_number_prefix: "shop".to_string(),
            ..Default::default()
        });

        let result = coordinator
            .create_order(request(vec![
                CartItem::new("A1", "Lamp", 1, 10.0, "shop-a"),
                CartItem::new("B1", "Mug", 1, 10.0, "shop-b"),
            ]))
            .await
            .unwrap();

        let numbers: Vec<_> = result.value.iter().map(|o| o.order_number()).collect();
        assert_eq!(numbers, vec!["shop-00001", "shop-00002"]);
    }

    #[tokio::test]
    async fn test_numbering_continues_from_counter() {
        let (coordinator, store) = setup(CoordinatorConfig::default());
        for _ in 0..41 {
            store.next_value(ORDER_SEQUENCE).await.unwrap();
        }

        let result = coordinator
            .create_order(request(vec![CartItem::new("A1", "Lamp", 1, 10.0, "shop-a")]))
            .await
            .unwrap();

        assert_eq!(result.value[0].order_number(), "wanttar-00042");
    }

    #[tokio::test]
    async fn test_empty_cart_is_invalid_request() {
        let (coordinator, store) = setup(CoordinatorConfig::default());

        let result = coordinator.create_order(request(vec![])).await;

        assert!(matches!(result, Err(FulfillmentError::InvalidRequest(_))));
        assert_eq!(store.order_count().await, 0);
    }

    #[tokio::test]
    async fn test_unknown_order_is_not_found() {
        let (coordinator, _) = setup(CoordinatorConfig::default());

        let result = coordinator.cancel_order(OrderId::new(), None).await;

        assert!(result.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_missing_product_aborts_before_status_write() {
        let (coordinator, store) = setup(CoordinatorConfig::default());
        store
            .upsert_product(Product::new("A1", "Lamp", 5))
            .await
            .unwrap();

        let placed = coordinator
            .create_order(request(vec![
                CartItem::new("A1", "Lamp", 1, 10.0, "shop-a"),
                CartItem::new("GHOST", "Missing", 1, 10.0, "shop-a"),
            ]))
            .await
            .unwrap();
        let id = placed.value[0].id();

        let result = coordinator
            .transition_status(
                id,
                StatusUpdate::new(OrderStatus::TransferredToDeliveryPartner),
            )
            .await;
        assert!(result.unwrap_err().is_not_found());

        // Earlier stock writes stay, the order itself is unchanged.
        let lamp = store
            .find_product(&common::ProductId::new("A1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(lamp.stock, 4);
        let order = coordinator.get_order(id).await.unwrap();
        assert_eq!(order.status(), OrderStatus::Processing);
        assert_eq!(order.status_history().len(), 1);
    }
}
