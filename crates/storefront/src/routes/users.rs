//! User session route handlers: login, logout, login-status.
//!
//! There is no cookie session; clients hold the user ID and the server
//! tracks an `is_logged_in` flag that gates cart and checkout access.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use fabrico_core::UserId;

use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::models::user::UserProfile;
use crate::services::AuthService;
use crate::state::AppState;

// =============================================================================
// Request Types
// =============================================================================

/// Login credentials. The identifier is the account email.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub identifier: String,
    pub password: String,
}

/// Request to set the login flag directly.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginStatusRequest {
    pub is_logged_in: bool,
}

/// Query for the registered-email probe.
#[derive(Debug, Deserialize)]
pub struct CheckEmailQuery {
    pub email: String,
}

// =============================================================================
// Response Types
// =============================================================================

/// Acknowledgement for logout.
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}

/// Response for the registered-email probe.
#[derive(Debug, Serialize)]
pub struct CheckEmailResponse {
    pub exists: bool,
}

// =============================================================================
// Handlers
// =============================================================================

/// Password login. Marks the user logged in and recomputes the unseen badge
/// from the current cart.
///
/// POST /users/login
///
/// # Errors
///
/// Returns 401 for unknown emails and wrong passwords alike.
#[instrument(skip(state, req))]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<UserProfile>, AppError> {
    let auth = AuthService::new(state.pool(), state.otp(), state.mailer());
    let user = auth.login(&req.identifier, &req.password).await?;

    set_sentry_user(&user.id, Some(user.email.as_str()));

    Ok(Json(UserProfile::from(user)))
}

/// Logout. Clears the login flag; the cart itself is untouched.
///
/// POST /users/logout/{userId}
///
/// # Errors
///
/// Returns 404 if the user does not exist.
#[instrument(skip(state))]
pub async fn logout(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<LogoutResponse>, AppError> {
    let auth = AuthService::new(state.pool(), state.otp(), state.mailer());
    auth.logout(user_id).await?;

    clear_sentry_user();

    Ok(Json(LogoutResponse { success: true }))
}

/// Set the login flag directly. Logging in through here recomputes the
/// unseen badge exactly like a password login.
///
/// PUT /users/{userId}/login-status
///
/// # Errors
///
/// Returns 404 if the user does not exist.
#[instrument(skip(state))]
pub async fn set_login_status(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Json(req): Json<LoginStatusRequest>,
) -> Result<Json<UserProfile>, AppError> {
    let auth = AuthService::new(state.pool(), state.otp(), state.mailer());
    let user = auth.set_login_status(user_id, req.is_logged_in).await?;
    Ok(Json(UserProfile::from(user)))
}

/// Registered-email probe used by the registration form.
///
/// GET /users/check-email?email=
///
/// Malformed addresses answer `{"exists": false}`.
///
/// # Errors
///
/// Returns `AppError` if the lookup fails.
#[instrument(skip(state))]
pub async fn check_email(
    State(state): State<AppState>,
    Query(query): Query<CheckEmailQuery>,
) -> Result<Json<CheckEmailResponse>, AppError> {
    let auth = AuthService::new(state.pool(), state.otp(), state.mailer());
    let exists = auth.check_email(&query.email).await?;
    Ok(Json(CheckEmailResponse { exists }))
}
