//! Product catalog route handlers.

use axum::Json;
use axum::extract::{Path, State};
use tracing::instrument;

use fabrico_core::ProductId;

use crate::error::AppError;
use crate::models::catalog::{ProductDetail, ProductSummary};
use crate::services::CatalogService;
use crate::state::AppState;

/// Product listing.
///
/// GET /products
///
/// # Errors
///
/// Returns `AppError` if the catalog read fails.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<ProductSummary>>, AppError> {
    let catalog = CatalogService::new(state.pool());
    Ok(Json(catalog.list().await?))
}

/// Product detail, variants in display order with COD resolved.
///
/// GET /products/{id}
///
/// # Errors
///
/// Returns 404 if the product does not exist.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductDetail>, AppError> {
    let catalog = CatalogService::new(state.pool());
    let product = catalog
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;
    Ok(Json(product))
}
