//! Cart repository for database operations.
//!
//! Cart mutations and the unseen-cart counter move together: any statement
//! pair that touches both runs inside one transaction. The
//! UNIQUE(user_id, product_id) constraint holds the one-line-per-product
//! invariant even when the same add races itself.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use fabrico_core::{CartLineId, ProductId, UserId, VariantId};

use super::RepositoryError;
use crate::models::cart::CartLine;

#[derive(sqlx::FromRow)]
struct CartLineRow {
    id: i64,
    user_id: i64,
    product_id: i64,
    variant_id: i64,
    quantity: i64,
    added_at: DateTime<Utc>,
}

impl CartLineRow {
    fn into_line(self) -> CartLine {
        CartLine {
            id: CartLineId::new(self.id),
            user_id: UserId::new(self.user_id),
            product_id: ProductId::new(self.product_id),
            variant_id: VariantId::new(self.variant_id),
            quantity: self.quantity,
            added_at: self.added_at,
        }
    }
}

const LINE_COLUMNS: &str = "id, user_id, product_id, variant_id, quantity, added_at";

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// All of a user's cart lines, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_lines(&self, user_id: UserId) -> Result<Vec<CartLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartLineRow>(&format!(
            "SELECT {LINE_COLUMNS} FROM cart_lines WHERE user_id = ?1 ORDER BY added_at, id"
        ))
        .bind(user_id.as_i64())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(CartLineRow::into_line).collect())
    }

    /// One user's line for one product, if present.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_line(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<Option<CartLine>, RepositoryError> {
        let row = sqlx::query_as::<_, CartLineRow>(&format!(
            "SELECT {LINE_COLUMNS} FROM cart_lines WHERE user_id = ?1 AND product_id = ?2"
        ))
        .bind(user_id.as_i64())
        .bind(product_id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(CartLineRow::into_line))
    }

    /// Insert a line and bump the unseen counter, atomically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the product is already in the
    /// cart. Returns `RepositoryError::Database` for other database errors.
    pub async fn insert_line(
        &self,
        user_id: UserId,
        product_id: ProductId,
        variant_id: VariantId,
        quantity: i64,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO cart_lines (user_id, product_id, variant_id, quantity, added_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(user_id.as_i64())
        .bind(product_id.as_i64())
        .bind(variant_id.as_i64())
        .bind(quantity)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("product already in cart".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        sqlx::query("UPDATE users SET unseen_cart_count = unseen_cart_count + 1 WHERE id = ?1")
            .bind(user_id.as_i64())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Set a line's quantity.
    ///
    /// # Returns
    ///
    /// Returns `false` if the user has no line for this product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query("UPDATE cart_lines SET quantity = ?1 WHERE user_id = ?2 AND product_id = ?3")
                .bind(quantity)
                .bind(user_id.as_i64())
                .bind(product_id.as_i64())
                .execute(self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Switch a line to another variant. One statement: the quantity resets
    /// to 1 in the same write, so no intermediate state is ever visible.
    ///
    /// # Returns
    ///
    /// Returns `false` if the user has no line for this product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn change_variant(
        &self,
        user_id: UserId,
        product_id: ProductId,
        variant_id: VariantId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE cart_lines SET variant_id = ?1, quantity = 1 \
             WHERE user_id = ?2 AND product_id = ?3",
        )
        .bind(variant_id.as_i64())
        .bind(user_id.as_i64())
        .bind(product_id.as_i64())
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a line and decrement the unseen counter (floored at zero),
    /// atomically. Removing an absent line is a no-op.
    ///
    /// # Returns
    ///
    /// Returns `true` if a line was actually removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn remove_line(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM cart_lines WHERE user_id = ?1 AND product_id = ?2")
            .bind(user_id.as_i64())
            .bind(product_id.as_i64())
            .execute(&mut *tx)
            .await?;

        let removed = result.rows_affected() > 0;
        if removed {
            sqlx::query(
                "UPDATE users SET unseen_cart_count = MAX(unseen_cart_count - 1, 0) WHERE id = ?1",
            )
            .bind(user_id.as_i64())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(removed)
    }

    /// Reset the unseen counter; the user has looked at their cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn mark_seen(&self, user_id: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE users SET unseen_cart_count = 0 WHERE id = ?1")
            .bind(user_id.as_i64())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Complete a checkout: decrement stock for every line, drop the cart
    /// and reset the unseen counter, all in one transaction.
    ///
    /// The stock decrement is guarded (`quantity >= wanted`), so a line that
    /// went stale since validation rolls the whole checkout back.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if any variant no longer has
    /// enough stock. Returns `RepositoryError::Database` for other errors.
    pub async fn commit_checkout(
        &self,
        user_id: UserId,
        lines: &[(VariantId, i64)],
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        for (variant_id, quantity) in lines {
            let result = sqlx::query(
                "UPDATE product_variants SET quantity = quantity - ?1 \
                 WHERE id = ?2 AND quantity >= ?1",
            )
            .bind(quantity)
            .bind(variant_id.as_i64())
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(RepositoryError::Conflict(format!(
                    "insufficient stock for variant {variant_id}"
                )));
            }
        }

        sqlx::query("DELETE FROM cart_lines WHERE user_id = ?1")
            .bind(user_id.as_i64())
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE users SET unseen_cart_count = 0 WHERE id = ?1")
            .bind(user_id.as_i64())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }
}
