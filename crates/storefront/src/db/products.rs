//! Product repository for database operations.
//!
//! The catalog is read-mostly: the storefront only reads, the seeding CLI
//! writes. Variant stock is the exception and is decremented by checkout.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::SqlitePool;

use fabrico_core::{Category, ColorToken, ProductId, VariantId};

use super::RepositoryError;
use crate::models::catalog::{NewProduct, Product, Variant};

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    description: Option<String>,
    price: String,
    category: Category,
    sub_category: String,
    cod_available: bool,
    sizes: String,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct VariantRow {
    id: i64,
    product_id: i64,
    position: i64,
    color: String,
    quantity: i64,
    images: String,
    cod_available: Option<bool>,
}

impl ProductRow {
    fn into_product(self, variants: Vec<Variant>) -> Result<Product, RepositoryError> {
        let price = Decimal::from_str(&self.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price in database: {e}"))
        })?;
        let sizes: Vec<String> = serde_json::from_str(&self.sizes).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid sizes in database: {e}"))
        })?;

        Ok(Product {
            id: ProductId::new(self.id),
            name: self.name,
            description: self.description,
            price,
            category: self.category,
            sub_category: self.sub_category,
            cod_available: self.cod_available,
            sizes,
            variants,
            created_at: self.created_at,
        })
    }
}

impl VariantRow {
    fn into_variant(self) -> Result<Variant, RepositoryError> {
        let color = ColorToken::parse(&self.color).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid color in database: {e}"))
        })?;
        let images: Vec<String> = serde_json::from_str(&self.images).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid images in database: {e}"))
        })?;

        Ok(Variant {
            id: VariantId::new(self.id),
            position: self.position,
            color,
            quantity: self.quantity,
            images,
            cod_available: self.cod_available,
        })
    }
}

const PRODUCT_COLUMNS: &str =
    "id, name, description, price, category, sub_category, cod_available, sizes, created_at";

const VARIANT_COLUMNS: &str = "id, product_id, position, color, quantity, images, cod_available";

/// Repository for catalog database operations.
pub struct ProductRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// All products, newest first, with variants in display order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let product_rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        let variant_rows = sqlx::query_as::<_, VariantRow>(&format!(
            "SELECT {VARIANT_COLUMNS} FROM product_variants ORDER BY product_id, position"
        ))
        .fetch_all(self.pool)
        .await?;

        let mut by_product: HashMap<i64, Vec<Variant>> = HashMap::new();
        for row in variant_rows {
            let product_id = row.product_id;
            by_product
                .entry(product_id)
                .or_default()
                .push(row.into_variant()?);
        }

        let mut products = Vec::with_capacity(product_rows.len());
        for row in product_rows {
            let variants = by_product.remove(&row.id).unwrap_or_default();
            products.push(row.into_product(variants)?);
        }

        Ok(products)
    }

    /// One product with its variants.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let variant_rows = sqlx::query_as::<_, VariantRow>(&format!(
            "SELECT {VARIANT_COLUMNS} FROM product_variants WHERE product_id = ?1 ORDER BY position"
        ))
        .bind(id.as_i64())
        .fetch_all(self.pool)
        .await?;

        let mut variants = Vec::with_capacity(variant_rows.len());
        for v in variant_rows {
            variants.push(v.into_variant()?);
        }

        Ok(Some(row.into_product(variants)?))
    }

    /// Insert a product and its variants. Used by the seeding CLI.
    ///
    /// Variant positions are assigned from the input order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn create(&self, new: &NewProduct) -> Result<Product, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let sizes = serde_json::to_string(&new.sizes).map_err(|e| {
            RepositoryError::DataCorruption(format!("failed to serialize sizes: {e}"))
        })?;

        let product_id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO products \
             (name, description, price, category, sub_category, cod_available, sizes, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8) \
             RETURNING id",
        )
        .bind(&new.name)
        .bind(new.description.as_deref())
        .bind(new.price.to_string())
        .bind(new.category)
        .bind(&new.sub_category)
        .bind(new.cod_available)
        .bind(&sizes)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        for (position, variant) in new.variants.iter().enumerate() {
            let images = serde_json::to_string(&variant.images).map_err(|e| {
                RepositoryError::DataCorruption(format!("failed to serialize images: {e}"))
            })?;

            sqlx::query(
                "INSERT INTO product_variants \
                 (product_id, position, color, quantity, images, cod_available) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .bind(product_id)
            .bind(i64::try_from(position).unwrap_or(i64::MAX))
            .bind(variant.color.as_str())
            .bind(variant.quantity)
            .bind(&images)
            .bind(variant.cod_available)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.get(ProductId::new(product_id))
            .await?
            .ok_or(RepositoryError::NotFound)
    }
}
