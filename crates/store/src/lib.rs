//! Persistence for the marketplace order core.
//!
//! Repositories are traits so the order core can run against the
//! in-memory implementation in tests and PostgreSQL in production.
//! Stock, wallet and sequence updates are single atomic increments.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod records;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use records::{Product, Shop};
pub use store::{
    MarketplaceStore, OrderRepository, OrderSequence, ProductRepository, ShopRepository,
    StoreExt,
};
