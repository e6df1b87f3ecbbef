use async_trait::async_trait;
use common::{OrderId, ProductId, ShopId, UserId};
use domain::Order;

use crate::{Product, Result, Shop, StoreError};

/// Persistence for seller orders.
///
/// Orders are stored whole. `save_order` overwrites unconditionally, so
/// concurrent writers to the same order resolve last-write-wins.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Stores a new order. Fails with `Duplicate` if the ID is taken.
    async fn insert_order(&self, order: &Order) -> Result<()>;

    /// Inserts or replaces an order.
    async fn save_order(&self, order: &Order) -> Result<()>;

    /// Retrieves an order by ID.
    async fn find_order(&self, id: OrderId) -> Result<Option<Order>>;

    /// Orders of one seller, newest first.
    async fn list_orders_by_shop(&self, shop_id: &ShopId) -> Result<Vec<Order>>;

    /// Orders of one buyer, newest first.
    async fn list_orders_by_user(&self, user_id: &UserId) -> Result<Vec<Order>>;
}

/// Catalog stock counters.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_product(&self, id: &ProductId) -> Result<Option<Product>>;

    /// Inserts or replaces a product.
    async fn upsert_product(&self, product: Product) -> Result<()>;

    /// Atomically adds `delta_stock` to stock and `delta_sold_out` to
    /// sold_out, returning the updated product.
    ///
    /// Fails with `NotFound` if the product does not exist.
    async fn adjust_stock(
        &self,
        id: &ProductId,
        delta_stock: i64,
        delta_sold_out: i64,
    ) -> Result<Product>;
}

/// Seller wallets.
#[async_trait]
pub trait ShopRepository: Send + Sync {
    async fn find_shop(&self, id: &ShopId) -> Result<Option<Shop>>;

    /// Inserts or replaces a shop.
    async fn upsert_shop(&self, shop: Shop) -> Result<()>;

    /// Atomically adds `amount` to the shop's available balance, returning
    /// the updated shop.
    ///
    /// Fails with `NotFound` if the shop does not exist.
    async fn credit_balance(&self, id: &ShopId, amount: f64) -> Result<Shop>;
}

/// Named monotonic counters.
#[async_trait]
pub trait OrderSequence: Send + Sync {
    /// Atomically increments the counter and returns the new value.
    /// The first call for a name returns 1.
    async fn next_value(&self, name: &str) -> Result<u64>;
}

/// Everything the order core needs from storage.
pub trait MarketplaceStore:
    OrderRepository + ProductRepository + ShopRepository + OrderSequence
{
}

impl<T> MarketplaceStore for T where
    T: OrderRepository + ProductRepository + ShopRepository + OrderSequence
{
}

/// Extension trait providing convenience methods for stores.
#[async_trait]
pub trait StoreExt: OrderRepository {
    /// Retrieves an order, failing with `NotFound` if it does not exist.
    async fn get_order(&self, id: OrderId) -> Result<Order> {
        self.find_order(id)
            .await?
            .ok_or_else(|| StoreError::not_found("Order", id))
    }
}

// Blanket implementation for all order repositories
impl<T: OrderRepository + ?Sized> StoreExt for T {}
