//! Cart route handlers.
//!
//! Every mutation returns the full [`CartSnapshot`] so clients never have to
//! reconcile partial updates; the snapshot also carries the unseen-items
//! badge count.

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;
use tracing::instrument;

use fabrico_core::{ProductId, UserId};

use crate::error::{AppError, add_breadcrumb};
use crate::models::cart::CartSnapshot;
use crate::services::CartService;
use crate::state::AppState;

// =============================================================================
// Request Types
// =============================================================================

/// Request to add a product to the cart. New lines start at quantity 1.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub user_id: UserId,
    pub product_id: ProductId,
    /// Display position of the chosen color variant.
    pub variant_index: i64,
}

/// Request to remove a product from the cart.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFromCartRequest {
    pub user_id: UserId,
    pub product_id: ProductId,
}

/// Request to change the quantity of a line already in the cart.
///
/// The line's stored variant is authoritative; a `variantIndex` field in the
/// payload is accepted and ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuantityRequest {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: i64,
}

/// Request to switch a line to another color variant. Quantity resets to 1.
///
/// The line's stored variant identifies what is being switched away from; an
/// `oldVariantIndex` field in the payload is accepted and ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVariantRequest {
    pub user_id: UserId,
    pub product_id: ProductId,
    /// Display position of the variant to switch to.
    pub new_variant_index: i64,
}

// =============================================================================
// Handlers
// =============================================================================

/// Add a product to the cart.
///
/// POST /cart/add
///
/// # Errors
///
/// Returns 409 if the product is already in the cart, 400 if the chosen
/// variant has no stock.
#[instrument(skip(state))]
pub async fn add(
    State(state): State<AppState>,
    Json(req): Json<AddToCartRequest>,
) -> Result<Json<CartSnapshot>, AppError> {
    let cart = CartService::new(state.pool());
    let snapshot = cart
        .add(req.user_id, req.product_id, req.variant_index, 1)
        .await?;

    let product_id = req.product_id.to_string();
    add_breadcrumb(
        "cart",
        "Added product to cart",
        Some(&[("product_id", product_id.as_str())]),
    );

    Ok(Json(snapshot))
}

/// Remove a product from the cart. Removing an absent line is a no-op.
///
/// POST /cart/remove
///
/// # Errors
///
/// Returns 404 if the user does not exist, 401 if they are not logged in.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    Json(req): Json<RemoveFromCartRequest>,
) -> Result<Json<CartSnapshot>, AppError> {
    let cart = CartService::new(state.pool());
    let snapshot = cart.remove(req.user_id, req.product_id).await?;
    Ok(Json(snapshot))
}

/// Change a line's quantity.
///
/// PUT /cart/update
///
/// # Errors
///
/// Returns 400 if the quantity is below 1 or above the variant's live stock,
/// 404 if the product is not in the cart.
#[instrument(skip(state))]
pub async fn update(
    State(state): State<AppState>,
    Json(req): Json<UpdateQuantityRequest>,
) -> Result<Json<CartSnapshot>, AppError> {
    let cart = CartService::new(state.pool());
    let snapshot = cart
        .update_quantity(req.user_id, req.product_id, req.quantity)
        .await?;
    Ok(Json(snapshot))
}

/// Switch a line to another color variant in one atomic update.
///
/// PUT /cart/update-variant
///
/// # Errors
///
/// Returns 404 if the product is not in the cart or the target variant does
/// not exist, 400 if the target variant has no stock.
#[instrument(skip(state))]
pub async fn update_variant(
    State(state): State<AppState>,
    Json(req): Json<UpdateVariantRequest>,
) -> Result<Json<CartSnapshot>, AppError> {
    let cart = CartService::new(state.pool());
    let snapshot = cart
        .change_variant(req.user_id, req.product_id, req.new_variant_index)
        .await?;
    Ok(Json(snapshot))
}

/// Current cart, resolved against the live catalog.
///
/// GET /cart/{userId}
///
/// # Errors
///
/// Returns 404 if the user does not exist, 401 if they are not logged in.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<CartSnapshot>, AppError> {
    let cart = CartService::new(state.pool());
    let snapshot = cart.get_cart(user_id).await?;
    Ok(Json(snapshot))
}

/// Mark the cart viewed, resetting the unseen badge to zero.
///
/// POST /cart/{userId}/seen
///
/// # Errors
///
/// Returns 404 if the user does not exist, 401 if they are not logged in.
#[instrument(skip(state))]
pub async fn mark_seen(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<CartSnapshot>, AppError> {
    let cart = CartService::new(state.pool());
    let snapshot = cart.mark_seen(user_id).await?;
    Ok(Json(snapshot))
}
