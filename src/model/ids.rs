use serde::{Deserialize, Serialize};
use std::fmt::Display;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}_{}", $prefix, self.0)
            }
        }
    };
}

uuid_id!(
    /// Catalog product identifier.
    ProductId,
    "product"
);
uuid_id!(
    /// Catalog variant identifier.
    VariantId,
    "variant"
);
uuid_id!(
    /// Order that stock is reserved or sold against.
    OrderId,
    "order"
);
uuid_id!(ReservationId, "reservation");
uuid_id!(AlertId, "alert");

/// Identity of an inventory record: a product, or one variant of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StockKey {
    pub product_id: ProductId,
    pub variant_id: Option<VariantId>,
}

impl StockKey {
    /// Key for stock tracked at product level.
    pub fn product(product_id: ProductId) -> Self {
        Self {
            product_id,
            variant_id: None,
        }
    }

    /// Key for stock tracked per variant.
    pub fn variant(product_id: ProductId, variant_id: VariantId) -> Self {
        Self {
            product_id,
            variant_id: Some(variant_id),
        }
    }
}

impl Display for StockKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.variant_id {
            Some(variant) => write!(f, "{}/{}", self.product_id, variant),
            None => write!(f, "{}", self.product_id),
        }
    }
}
