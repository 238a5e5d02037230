//! Address book route handlers.
//!
//! Addresses are validated against the pincode serviceability registry
//! before anything is stored; locality fields the client leaves blank are
//! auto-filled from the registry entry.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use tracing::instrument;

use fabrico_core::{AddressId, UserId};

use crate::error::AppError;
use crate::models::address::{Address, NewAddress};
use crate::services::AddressService;
use crate::state::AppState;

/// Saved addresses in insertion order.
///
/// GET /address/{userId}/addresses
///
/// # Errors
///
/// Returns 404 if the user does not exist.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<Vec<Address>>, AppError> {
    let addresses = AddressService::new(state.pool(), state.pincode_cache());
    Ok(Json(addresses.list(user_id).await?))
}

/// Save a new address. The first address becomes the default.
///
/// POST /address/{userId}/addresses
///
/// # Errors
///
/// Returns 409 once the user has 3 addresses, 400 if validation fails or
/// the pincode is not serviceable.
#[instrument(skip(state, req))]
pub async fn create(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Json(req): Json<NewAddress>,
) -> Result<(StatusCode, Json<Address>), AppError> {
    let addresses = AddressService::new(state.pool(), state.pincode_cache());
    let created = addresses.add(user_id, &req).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a saved address. Re-runs the full validation.
///
/// PUT /address/{userId}/addresses/{id}
///
/// # Errors
///
/// Returns 404 if the address does not belong to the user.
#[instrument(skip(state, req))]
pub async fn update(
    State(state): State<AppState>,
    Path((user_id, id)): Path<(UserId, AddressId)>,
    Json(req): Json<NewAddress>,
) -> Result<Json<Address>, AppError> {
    let addresses = AddressService::new(state.pool(), state.pincode_cache());
    Ok(Json(addresses.update(user_id, id, &req).await?))
}

/// Make an address the default, clearing the flag on all others.
///
/// PUT /address/{userId}/addresses/{id}/default
///
/// Responds with the updated address list so clients see the new flags in
/// one round trip.
///
/// # Errors
///
/// Returns 404 if the address does not belong to the user.
#[instrument(skip(state))]
pub async fn set_default(
    State(state): State<AppState>,
    Path((user_id, id)): Path<(UserId, AddressId)>,
) -> Result<Json<Vec<Address>>, AppError> {
    let addresses = AddressService::new(state.pool(), state.pincode_cache());
    Ok(Json(addresses.set_default(user_id, id).await?))
}

/// Delete a saved address.
///
/// DELETE /address/{userId}/addresses/{id}
///
/// If the deleted address was the default and others remain, the oldest
/// remaining address is promoted; the response reflects the new flags.
///
/// # Errors
///
/// Returns 404 if the address does not belong to the user.
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    Path((user_id, id)): Path<(UserId, AddressId)>,
) -> Result<Json<Vec<Address>>, AppError> {
    let addresses = AddressService::new(state.pool(), state.pincode_cache());
    Ok(Json(addresses.delete(user_id, id).await?))
}
