//! Cart service.
//!
//! A cart line stores only product, variant and quantity. Every operation
//! returns a full snapshot resolved against the live catalog, so clients
//! always see current price, stock and COD. All operations require the user
//! to exist and be logged in.

use sqlx::SqlitePool;
use thiserror::Error;

use fabrico_core::{ProductId, UserId};

use crate::db::RepositoryError;
use crate::db::cart::CartRepository;
use crate::db::products::ProductRepository;
use crate::db::users::UserRepository;
use crate::models::cart::{CartLineView, CartSnapshot};
use crate::models::catalog::Product;
use crate::models::user::User;

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// User not found.
    #[error("user not found")]
    UserNotFound,

    /// User exists but is not logged in.
    #[error("user is not logged in")]
    NotLoggedIn,

    /// Product not found in the catalog.
    #[error("product not found")]
    ProductNotFound,

    /// No variant at the requested position.
    #[error("variant not found")]
    VariantNotFound,

    /// Product is already in the cart; switching color goes through
    /// `change_variant`.
    #[error("product already in cart")]
    AlreadyInCart,

    /// Operation targets a product that is not in the cart.
    #[error("product not in cart")]
    LineNotFound,

    /// Quantity outside the accepted range.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    /// Requested quantity exceeds the variant's stock.
    #[error("insufficient stock, {available} available")]
    OutOfStock { available: i64 },

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Cart operations for a single user.
pub struct CartService<'a> {
    users: UserRepository<'a>,
    products: ProductRepository<'a>,
    cart: CartRepository<'a>,
}

impl<'a> CartService<'a> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            users: UserRepository::new(pool),
            products: ProductRepository::new(pool),
            cart: CartRepository::new(pool),
        }
    }

    /// Add a product to the cart.
    ///
    /// The chosen variant is addressed by display position. A product can be
    /// in the cart at most once.
    ///
    /// # Errors
    ///
    /// Returns `CartError::AlreadyInCart` if the product is already in the cart.
    /// Returns `CartError::OutOfStock` if the variant has fewer units than requested.
    pub async fn add(
        &self,
        user_id: UserId,
        product_id: ProductId,
        variant_index: i64,
        quantity: i64,
    ) -> Result<CartSnapshot, CartError> {
        self.require_logged_in(user_id).await?;

        let product = self.get_product(product_id).await?;
        let variant = product
            .variant_at(variant_index)
            .ok_or(CartError::VariantNotFound)?;

        check_quantity(quantity, variant.quantity)?;

        self.cart
            .insert_line(user_id, product_id, variant.id, quantity)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => CartError::AlreadyInCart,
                other => CartError::Repository(other),
            })?;

        self.snapshot(user_id).await
    }

    /// Set the quantity of a line already in the cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::LineNotFound` if the product is not in the cart.
    /// Returns `CartError::OutOfStock` if the variant has fewer units than requested.
    pub async fn update_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<CartSnapshot, CartError> {
        self.require_logged_in(user_id).await?;

        let product = self.get_product(product_id).await?;
        let line = self
            .cart
            .get_line(user_id, product_id)
            .await?
            .ok_or(CartError::LineNotFound)?;
        let variant = product
            .variants
            .iter()
            .find(|v| v.id == line.variant_id)
            .ok_or(CartError::VariantNotFound)?;

        check_quantity(quantity, variant.quantity)?;

        if !self
            .cart
            .update_quantity(user_id, product_id, quantity)
            .await?
        {
            return Err(CartError::LineNotFound);
        }

        self.snapshot(user_id).await
    }

    /// Switch a line to another color variant of the same product.
    ///
    /// The replace happens in one statement and resets the quantity to 1, so
    /// the cart never passes through a state with the product missing.
    ///
    /// # Errors
    ///
    /// Returns `CartError::LineNotFound` if the product is not in the cart.
    /// Returns `CartError::OutOfStock` if the target variant has no stock.
    pub async fn change_variant(
        &self,
        user_id: UserId,
        product_id: ProductId,
        variant_index: i64,
    ) -> Result<CartSnapshot, CartError> {
        self.require_logged_in(user_id).await?;

        let product = self.get_product(product_id).await?;
        let variant = product
            .variant_at(variant_index)
            .ok_or(CartError::VariantNotFound)?;

        if variant.quantity < 1 {
            return Err(CartError::OutOfStock { available: 0 });
        }

        if !self
            .cart
            .change_variant(user_id, product_id, variant.id)
            .await?
        {
            return Err(CartError::LineNotFound);
        }

        self.snapshot(user_id).await
    }

    /// Remove a product from the cart. Removing a product that is not in the
    /// cart is a no-op, so retries are safe.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotLoggedIn` if the user is not logged in.
    pub async fn remove(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<CartSnapshot, CartError> {
        self.require_logged_in(user_id).await?;

        self.cart.remove_line(user_id, product_id).await?;

        self.snapshot(user_id).await
    }

    /// The user's cart resolved against the live catalog.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotLoggedIn` if the user is not logged in.
    pub async fn get_cart(&self, user_id: UserId) -> Result<CartSnapshot, CartError> {
        let user = self.require_logged_in(user_id).await?;
        self.snapshot_for(&user).await
    }

    /// Reset the unseen-additions counter after the user has viewed the cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotLoggedIn` if the user is not logged in.
    pub async fn mark_seen(&self, user_id: UserId) -> Result<CartSnapshot, CartError> {
        self.require_logged_in(user_id).await?;

        self.cart.mark_seen(user_id).await.map_err(|e| match e {
            RepositoryError::NotFound => CartError::UserNotFound,
            other => CartError::Repository(other),
        })?;

        self.snapshot(user_id).await
    }

    // ===== Helper Functions =====

    async fn require_logged_in(&self, user_id: UserId) -> Result<User, CartError> {
        let user = self
            .users
            .get_by_id(user_id)
            .await?
            .ok_or(CartError::UserNotFound)?;

        if !user.is_logged_in {
            return Err(CartError::NotLoggedIn);
        }

        Ok(user)
    }

    async fn get_product(&self, product_id: ProductId) -> Result<Product, CartError> {
        self.products
            .get(product_id)
            .await?
            .ok_or(CartError::ProductNotFound)
    }

    /// Snapshot with the counter re-read, for use right after a mutation.
    async fn snapshot(&self, user_id: UserId) -> Result<CartSnapshot, CartError> {
        let user = self
            .users
            .get_by_id(user_id)
            .await?
            .ok_or(CartError::UserNotFound)?;
        self.snapshot_for(&user).await
    }

    async fn snapshot_for(&self, user: &User) -> Result<CartSnapshot, CartError> {
        let lines = self.cart.list_lines(user.id).await?;

        let mut items = Vec::with_capacity(lines.len());
        for line in &lines {
            // Lines whose product or variant has left the catalog are hidden
            // rather than failing the whole snapshot
            let Some(product) = self.products.get(line.product_id).await? else {
                continue;
            };
            let Some(variant) = product.variants.iter().find(|v| v.id == line.variant_id) else {
                continue;
            };
            items.push(CartLineView::resolve(line, &product, variant));
        }

        Ok(CartSnapshot::new(items, user.unseen_cart_count))
    }
}

fn check_quantity(quantity: i64, available: i64) -> Result<(), CartError> {
    if quantity < 1 {
        return Err(CartError::InvalidQuantity(
            "Quantity must be at least 1".to_string(),
        ));
    }
    if quantity > available {
        return Err(CartError::OutOfStock { available });
    }
    Ok(())
}
