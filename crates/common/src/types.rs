use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an order.
///
/// Generated by the system at checkout; the human-facing order number
/// is a separate sequential value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(Uuid);

impl OrderId {
    /// Creates a new random order ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an order ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for OrderId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<OrderId> for Uuid {
    fn from(id: OrderId) -> Self {
        id.0
    }
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier from a string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Catalog product identifier.
    ProductId
);

string_id!(
    /// Seller (shop) identifier. Every shop owns one wallet.
    ShopId
);

string_id!(
    /// Buyer identifier.
    UserId
);

/// Who sells a cart line item.
///
/// `Platform` is the reserved sentinel for catalog entries owned by the
/// marketplace itself; such entries have no wallet to credit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum SellerRef {
    Platform,
    Shop(ShopId),
}

impl SellerRef {
    /// Wire value of the platform sentinel.
    pub const PLATFORM_SENTINEL: &'static str = "platform";

    /// Returns the shop ID for real sellers, `None` for the platform.
    pub fn shop_id(&self) -> Option<&ShopId> {
        match self {
            SellerRef::Platform => None,
            SellerRef::Shop(id) => Some(id),
        }
    }

    /// Returns true for the platform sentinel.
    pub fn is_platform(&self) -> bool {
        matches!(self, SellerRef::Platform)
    }

    /// Returns the wire representation.
    pub fn as_str(&self) -> &str {
        match self {
            SellerRef::Platform => Self::PLATFORM_SENTINEL,
            SellerRef::Shop(id) => id.as_str(),
        }
    }
}

impl std::fmt::Display for SellerRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for SellerRef {
    fn from(s: String) -> Self {
        if s.is_empty() || s == Self::PLATFORM_SENTINEL {
            SellerRef::Platform
        } else {
            SellerRef::Shop(ShopId(s))
        }
    }
}

impl From<&str> for SellerRef {
    fn from(s: &str) -> Self {
        SellerRef::from(s.to_string())
    }
}

impl From<ShopId> for SellerRef {
    fn from(id: ShopId) -> Self {
        SellerRef::Shop(id)
    }
}

impl From<SellerRef> for String {
    fn from(seller: SellerRef) -> Self {
        match seller {
            SellerRef::Platform => SellerRef::PLATFORM_SENTINEL.to_string(),
            SellerRef::Shop(id) => id.0,
        }
    }
}
