//! Identifiers shared across the marketplace crates.

mod types;

pub use types::{OrderId, ProductId, SellerRef, ShopId, UserId};
