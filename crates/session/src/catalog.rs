//! Product catalog trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::ProductId;
use domain::Product;
use thiserror::Error;

/// Errors that can occur when resolving products.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// The referenced product identifier does not resolve.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// The catalog backend failed.
    #[error("Catalog lookup failed: {0}")]
    Lookup(String),
}

/// Read-only product lookup, consumed by the cart core.
///
/// Prices are resolved through this trait at operation time, so a catalog
/// price change is reflected in cart totals on the next recompute.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Resolves a product by its identifier.
    async fn find_product(&self, product_id: &ProductId) -> Result<Product, CatalogError>;
}

/// In-memory product catalog for tests and single-process deployments.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProductCatalog {
    products: Arc<RwLock<HashMap<ProductId, Product>>>,
}

impl InMemoryProductCatalog {
    /// Creates a new empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a product listing.
    pub fn upsert(&self, product: Product) {
        self.products
            .write()
            .unwrap()
            .insert(product.id.clone(), product);
    }

    /// Returns the number of listed products.
    pub fn product_count(&self) -> usize {
        self.products.read().unwrap().len()
    }
}

#[async_trait]
impl ProductCatalog for InMemoryProductCatalog {
    async fn find_product(&self, product_id: &ProductId) -> Result<Product, CatalogError> {
        self.products
            .read()
            .unwrap()
            .get(product_id)
            .cloned()
            .ok_or_else(|| CatalogError::ProductNotFound(product_id.clone()))
    }
}
