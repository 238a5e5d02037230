//! Pincode serviceability route handler.

use axum::Json;
use axum::extract::{Path, State};
use tracing::instrument;

use crate::error::AppError;
use crate::models::pincode::PincodeCheck;
use crate::services::PincodeService;
use crate::state::AppState;

/// Delivery serviceability check for a pincode.
///
/// GET /pincodes/check/{pincode}
///
/// Malformed and unknown pincodes both answer `{"valid": false}`; the
/// locality fields appear only for serviceable areas.
///
/// # Errors
///
/// Returns `AppError` if the registry read fails.
#[instrument(skip(state))]
pub async fn check(
    State(state): State<AppState>,
    Path(pincode): Path<String>,
) -> Result<Json<PincodeCheck>, AppError> {
    let pincodes = PincodeService::new(state.pool(), state.pincode_cache());
    Ok(Json(pincodes.check(&pincode).await?))
}
