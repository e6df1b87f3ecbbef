use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{OrderId, ProductId, ShopId, UserId};
use domain::Order;
use tokio::sync::RwLock;

use crate::{
    Product, Result, Shop, StoreError,
    store::{OrderRepository, OrderSequence, ProductRepository, ShopRepository},
};

#[derive(Default)]
struct InMemoryState {
    orders: HashMap<OrderId, Order>,
    products: HashMap<ProductId, Product>,
    shops: HashMap<ShopId, Shop>,
    counters: HashMap<String, u64>,
}

/// In-memory store implementation for testing and local runs.
///
/// Every operation takes the single write lock for its whole
/// read-modify-write, which gives the same atomicity as the PostgreSQL
/// increments.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<InMemoryState>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of orders stored.
    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }

    /// Clears all records and counters.
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.orders.clear();
        state.products.clear();
        state.shops.clear();
        state.counters.clear();
    }
}

fn newest_first(mut orders: Vec<Order>) -> Vec<Order> {
    orders.sort_by(|a, b| {
        b.created_at()
            .cmp(&a.created_at())
            .then_with(|| b.order_number().cmp(a.order_number()))
    });
    orders
}

#[async_trait]
impl OrderRepository for InMemoryStore {
    async fn insert_order(&self, order: &Order) -> Result<()> {
        let mut state = self.state.write().await;
        if state.orders.contains_key(&order.id()) {
            return Err(StoreError::Duplicate {
                entity: "Order",
                id: order.id().to_string(),
            });
        }
        state.orders.insert(order.id(), order.clone());
        Ok(())
    }

    async fn save_order(&self, order: &Order) -> Result<()> {
        self.state
            .write()
            .await
            .orders
            .insert(order.id(), order.clone());
        Ok(())
    }

    async fn find_order(&self, id: OrderId) -> Result<Option<Order>> {
        Ok(self.state.read().await.orders.get(&id).cloned())
    }

    async fn list_orders_by_shop(&self, shop_id: &ShopId) -> Result<Vec<Order>> {
        let state = self.state.read().await;
        let orders = state
            .orders
            .values()
            .filter(|o| o.seller().shop_id() == Some(shop_id))
            .cloned()
            .collect();
        Ok(newest_first(orders))
    }

    async fn list_orders_by_user(&self, user_id: &UserId) -> Result<Vec<Order>> {
        let state = self.state.read().await;
        let orders = state
            .orders
            .values()
            .filter(|o| &o.user().id == user_id)
            .cloned()
            .collect();
        Ok(newest_first(orders))
    }
}

#[async_trait]
impl ProductRepository for InMemoryStore {
    async fn find_product(&self, id: &ProductId) -> Result<Option<Product>> {
        Ok(self.state.read().await.products.get(id).cloned())
    }

    async fn upsert_product(&self, product: Product) -> Result<()> {
        self.state
            .write()
            .await
            .products
            .insert(product.id.clone(), product);
        Ok(())
    }

    async fn adjust_stock(
        &self,
        id: &ProductId,
        delta_stock: i64,
        delta_sold_out: i64,
    ) -> Result<Product> {
        let mut state = self.state.write().await;
        let product = state
            .products
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("Product", id))?;
        product.stock += delta_stock;
        product.sold_out += delta_sold_out;
        Ok(product.clone())
    }
}

#[async_trait]
impl ShopRepository for InMemoryStore {
    async fn find_shop(&self, id: &ShopId) -> Result<Option<Shop>> {
        Ok(self.state.read().await.shops.get(id).cloned())
    }

    async fn upsert_shop(&self, shop: Shop) -> Result<()> {
        self.state.write().await.shops.insert(shop.id.clone(), shop);
        Ok(())
    }

    async fn credit_balance(&self, id: &ShopId, amount: f64) -> Result<Shop> {
        let mut state = self.state.write().await;
        let shop = state
            .shops
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("Shop", id))?;
        shop.available_balance += amount;
        Ok(shop.clone())
    }
}

#[async_trait]
impl OrderSequence for InMemoryStore {
    async fn next_value(&self, name: &str) -> Result<u64> {
        let mut state = self.state.write().await;
        let value = state.counters.entry(name.to_string()).or_insert(0);
        *value += 1;
        Ok(*value)
    }
}
