use async_trait::async_trait;
use common::{OrderId, ProductId, ShopId, UserId};
use domain::Order;
use sqlx::{
    PgPool, Row,
    postgres::{PgPoolOptions, PgRow},
};

use crate::{
    Product, Result, Shop, StoreError,
    store::{OrderRepository, OrderSequence, ProductRepository, ShopRepository},
};

/// PostgreSQL-backed store implementation.
///
/// Orders are kept as JSONB documents next to the columns used for lookup.
/// Stock, wallet and counter updates are single `UPDATE ... RETURNING`
/// statements so concurrent requests never lose an increment.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to `database_url` and applies pending migrations.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        let store = Self::new(pool);
        store.run_migrations().await?;
        Ok(store)
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        tracing::debug!("database migrations applied");
        Ok(())
    }

    fn row_to_order(row: PgRow) -> Result<Order> {
        let document: serde_json::Value = row.try_get("document")?;
        Ok(serde_json::from_value(document)?)
    }

    fn row_to_product(row: PgRow) -> Result<Product> {
        Ok(Product {
            id: ProductId::new(row.try_get::<String, _>("id")?),
            name: row.try_get("name")?,
            stock: row.try_get("stock")?,
            sold_out: row.try_get("sold_out")?,
        })
    }

    fn row_to_shop(row: PgRow) -> Result<Shop> {
        Ok(Shop {
            id: ShopId::new(row.try_get::<String, _>("id")?),
            name: row.try_get("name")?,
            available_balance: row.try_get("available_balance")?,
        })
    }

    async fn write_order(&self, order: &Order, upsert: bool) -> Result<()> {
        let document = serde_json::to_value(order)?;
        let sql = if upsert {
            r#"
            INSERT INTO orders (id, order_number, shop_id, user_id, status, document, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO UPDATE SET
                status = EXCLUDED.status,
                document = EXCLUDED.document,
                updated_at = EXCLUDED.updated_at
            "#
        } else {
            r#"
            INSERT INTO orders (id, order_number, shop_id, user_id, status, document, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#
        };

        sqlx::query(sql)
            .bind(order.id().as_uuid())
            .bind(order.order_number())
            .bind(order.seller().shop_id().map(|id| id.as_str()))
            .bind(order.user().id.as_str())
            .bind(order.status().as_str())
            .bind(document)
            .bind(order.created_at())
            .bind(order.updated_at())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_unique_violation()
                {
                    return StoreError::Duplicate {
                        entity: "Order",
                        id: order.id().to_string(),
                    };
                }
                StoreError::Database(e)
            })?;

        Ok(())
    }
}

#[async_trait]
impl OrderRepository for PostgresStore {
    async fn insert_order(&self, order: &Order) -> Result<()> {
        self.write_order(order, false).await
    }

    async fn save_order(&self, order: &Order) -> Result<()> {
        self.write_order(order, true).await
    }

    async fn find_order(&self, id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query("SELECT document FROM orders WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_order).transpose()
    }

    async fn list_orders_by_shop(&self, shop_id: &ShopId) -> Result<Vec<Order>> {
        let rows = sqlx::query(
            r#"
            SELECT document FROM orders
            WHERE shop_id = $1
            ORDER BY created_at DESC, order_number DESC
            "#,
        )
        .bind(shop_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_order).collect()
    }

    async fn list_orders_by_user(&self, user_id: &UserId) -> Result<Vec<Order>> {
        let rows = sqlx::query(
            r#"
            SELECT document FROM orders
            WHERE user_id = $1
            ORDER BY created_at DESC, order_number DESC
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_order).collect()
    }
}

#[async_trait]
impl ProductRepository for PostgresStore {
    async fn find_product(&self, id: &ProductId) -> Result<Option<Product>> {
        let row = sqlx::query("SELECT id, name, stock, sold_out FROM products WHERE id = $1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_product).transpose()
    }

    async fn upsert_product(&self, product: Product) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, stock, sold_out)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                stock = EXCLUDED.stock,
                sold_out = EXCLUDED.sold_out
            "#,
        )
        .bind(product.id.as_str())
        .bind(&product.name)
        .bind(product.stock)
        .bind(product.sold_out)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn adjust_stock(
        &self,
        id: &ProductId,
        delta_stock: i64,
        delta_sold_out: i64,
    ) -> Result<Product> {
        let row = sqlx::query(
            r#"
            UPDATE products
            SET stock = stock + $2, sold_out = sold_out + $3
            WHERE id = $1
            RETURNING id, name, stock, sold_out
            "#,
        )
        .bind(id.as_str())
        .bind(delta_stock)
        .bind(delta_sold_out)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Self::row_to_product(row),
            None => Err(StoreError::not_found("Product", id)),
        }
    }
}

#[async_trait]
impl ShopRepository for PostgresStore {
    async fn find_shop(&self, id: &ShopId) -> Result<Option<Shop>> {
        let row = sqlx::query("SELECT id, name, available_balance FROM shops WHERE id = $1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_shop).transpose()
    }

    async fn upsert_shop(&self, shop: Shop) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO shops (id, name, available_balance)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                available_balance = EXCLUDED.available_balance
            "#,
        )
        .bind(shop.id.as_str())
        .bind(&shop.name)
        .bind(shop.available_balance)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn credit_balance(&self, id: &ShopId, amount: f64) -> Result<Shop> {
        let row = sqlx::query(
            r#"
            UPDATE shops
            SET available_balance = available_balance + $2
            WHERE id = $1
            RETURNING id, name, available_balance
            "#,
        )
        .bind(id.as_str())
        .bind(amount)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Self::row_to_shop(row),
            None => Err(StoreError::not_found("Shop", id)),
        }
    }
}

#[async_trait]
impl OrderSequence for PostgresStore {
    async fn next_value(&self, name: &str) -> Result<u64> {
        let value: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO counters (name, value)
            VALUES ($1, 1)
            ON CONFLICT (name) DO UPDATE SET value = counters.value + 1
            RETURNING value
            "#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(value as u64)
    }
}
