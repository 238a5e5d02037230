//! Checkout route handler.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use tracing::instrument;

use fabrico_core::{AddressId, PaymentMethod, UserId};

use crate::error::{AppError, add_breadcrumb};
use crate::models::order::OrderReceipt;
use crate::services::CheckoutService;
use crate::state::AppState;

/// Request to place an order over the user's current cart.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub user_id: UserId,
    /// The saved address to deliver to.
    pub address_id: AddressId,
    pub payment_method: PaymentMethod,
}

/// Place an order: validate the cart against live stock, settle payment,
/// clear the cart and return a receipt.
///
/// POST /checkout
///
/// # Errors
///
/// Returns 404 if the address does not belong to the user, 400 for an empty
/// cart, a stale line that no longer fits stock, or a COD order containing a
/// non-COD item.
#[instrument(skip(state))]
pub async fn place_order(
    State(state): State<AppState>,
    Json(req): Json<CheckoutRequest>,
) -> Result<Json<OrderReceipt>, AppError> {
    let checkout = CheckoutService::new(state.pool());
    let receipt = checkout
        .place_order(req.user_id, req.address_id, req.payment_method)
        .await?;

    let order_ref = receipt.order_ref.to_string();
    add_breadcrumb(
        "checkout",
        "Order placed",
        Some(&[("order_ref", order_ref.as_str())]),
    );

    Ok(Json(receipt))
}
