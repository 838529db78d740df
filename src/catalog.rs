//! # Catalog
//!
//! Existence checks consumed from the product catalog. The ledger never owns catalog
//! data; it only asks whether a product or variant exists before creating a record.

use crate::model::{ProductId, VariantId};
use async_trait::async_trait;
use std::collections::HashSet;
use tokio::sync::RwLock;

#[async_trait]
pub trait Catalog: Send + Sync {
    async fn product_exists(&self, product_id: ProductId) -> bool;
    async fn variant_exists(&self, variant_id: VariantId) -> bool;
}

/// Catalog backed by in-process sets, for tests and the demo binary.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    products: RwLock<HashSet<ProductId>>,
    variants: RwLock<HashSet<VariantId>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register_product(&self, product_id: ProductId) {
        self.products.write().await.insert(product_id);
    }

    pub async fn register_variant(&self, product_id: ProductId, variant_id: VariantId) {
        self.register_product(product_id).await;
        self.variants.write().await.insert(variant_id);
    }
}

#[async_trait]
impl Catalog for InMemoryCatalog {
    async fn product_exists(&self, product_id: ProductId) -> bool {
        self.products.read().await.contains(&product_id)
    }

    async fn variant_exists(&self, variant_id: VariantId) -> bool {
        self.variants.read().await.contains(&variant_id)
    }
}
