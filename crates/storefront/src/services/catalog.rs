//! Catalog read service.

use sqlx::SqlitePool;

use fabrico_core::ProductId;

use crate::db::RepositoryError;
use crate::db::products::ProductRepository;
use crate::models::catalog::{ProductDetail, ProductSummary};

/// Read-only catalog access for the storefront.
pub struct CatalogService<'a> {
    products: ProductRepository<'a>,
}

impl<'a> CatalogService<'a> {
    /// Create a new catalog service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            products: ProductRepository::new(pool),
        }
    }

    /// All products for the listing grid, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the database operation fails.
    pub async fn list(&self) -> Result<Vec<ProductSummary>, RepositoryError> {
        let products = self.products.list().await?;
        Ok(products.iter().map(ProductSummary::from).collect())
    }

    /// Full product detail with per-variant COD resolved.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the database operation fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<ProductDetail>, RepositoryError> {
        let product = self.products.get(id).await?;
        Ok(product.map(ProductDetail::from))
    }
}
