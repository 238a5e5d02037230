//! Checkout service.
//!
//! Validates the live cart against stock and payment constraints, then
//! commits: stock decremented, cart cleared, counter zeroed, all in one
//! transaction. Orders themselves are not persisted; the caller gets an
//! ephemeral receipt and fulfilment picks it up downstream.

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::SqlitePool;
use thiserror::Error;

use fabrico_core::{AddressId, OrderRef, PaymentMethod, UserId, VariantId};

use crate::db::RepositoryError;
use crate::db::addresses::AddressRepository;
use crate::db::cart::CartRepository;
use crate::db::products::ProductRepository;
use crate::db::users::UserRepository;
use crate::models::cart::CartLineView;
use crate::models::order::OrderReceipt;

/// Errors that can occur while placing an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// User not found.
    #[error("user not found")]
    UserNotFound,

    /// User exists but is not logged in.
    #[error("user is not logged in")]
    NotLoggedIn,

    /// Shipping address not found or not owned by the user.
    #[error("address not found")]
    AddressNotFound,

    /// Nothing in the cart.
    #[error("cart is empty")]
    EmptyCart,

    /// A line's quantity no longer fits the variant's live stock.
    #[error("insufficient stock for {product}")]
    OutOfStock { product: String },

    /// Cash on delivery requested but a line does not allow it.
    #[error("cash on delivery not available for {0}")]
    CodNotAvailable(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Order placement over the live cart.
pub struct CheckoutService<'a> {
    users: UserRepository<'a>,
    products: ProductRepository<'a>,
    cart: CartRepository<'a>,
    addresses: AddressRepository<'a>,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            users: UserRepository::new(pool),
            products: ProductRepository::new(pool),
            cart: CartRepository::new(pool),
            addresses: AddressRepository::new(pool),
        }
    }

    /// Place an order for the user's whole cart.
    ///
    /// Validation runs in stage order: the shipping address must belong to
    /// the user, every line must still fit live stock, and the payment
    /// method must be accepted. Cash on delivery is only accepted when every
    /// line's effective COD flag allows it. The stock decrement re-checks
    /// availability inside the transaction, so two simultaneous checkouts
    /// cannot oversell a variant.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::OutOfStock` when a line no longer fits stock,
    /// `CheckoutError::CodNotAvailable` when COD is requested for a line
    /// that doesn't allow it.
    pub async fn place_order(
        &self,
        user_id: UserId,
        address_id: AddressId,
        payment_method: PaymentMethod,
    ) -> Result<OrderReceipt, CheckoutError> {
        let user = self
            .users
            .get_by_id(user_id)
            .await?
            .ok_or(CheckoutError::UserNotFound)?;
        if !user.is_logged_in {
            return Err(CheckoutError::NotLoggedIn);
        }

        let address = self
            .addresses
            .get(user_id, address_id)
            .await?
            .ok_or(CheckoutError::AddressNotFound)?;

        let lines = self.cart.list_lines(user_id).await?;
        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let mut items = Vec::with_capacity(lines.len());
        let mut decrements: Vec<(VariantId, i64)> = Vec::with_capacity(lines.len());
        for line in &lines {
            let product = self
                .products
                .get(line.product_id)
                .await?
                .ok_or_else(|| CheckoutError::OutOfStock {
                    product: "An item in your cart".to_string(),
                })?;
            let variant = product
                .variants
                .iter()
                .find(|v| v.id == line.variant_id)
                .ok_or_else(|| CheckoutError::OutOfStock {
                    product: product.name.clone(),
                })?;

            if line.quantity > variant.quantity {
                return Err(CheckoutError::OutOfStock {
                    product: product.name.clone(),
                });
            }

            items.push(CartLineView::resolve(line, &product, variant));
            decrements.push((variant.id, line.quantity));
        }

        if payment_method == PaymentMethod::Cod {
            if let Some(blocked) = items.iter().find(|i| !i.cod_available) {
                return Err(CheckoutError::CodNotAvailable(blocked.name.clone()));
            }
        }

        // Payment capture is out of scope here; both methods settle
        // downstream against the receipt reference
        self.cart
            .commit_checkout(user_id, &decrements)
            .await
            .map_err(|e| match e {
                // Stock moved between validation and commit
                RepositoryError::Conflict(_) => CheckoutError::OutOfStock {
                    product: "An item in your cart".to_string(),
                },
                other => CheckoutError::Repository(other),
            })?;

        let subtotal: Decimal = items.iter().map(|i| i.line_total).sum();
        Ok(OrderReceipt {
            order_ref: OrderRef::generate(),
            items,
            subtotal,
            payment_method,
            address,
            placed_at: Utc::now(),
        })
    }
}
