//! Registration and password-reset route handlers.
//!
//! Both flows are OTP-gated: a six-digit code is emailed to the address and
//! must be presented back within its TTL. Verification codes are single-use.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::AppError;
use crate::models::user::UserProfile;
use crate::services::AuthService;
use crate::state::AppState;

// =============================================================================
// Request Types
// =============================================================================

/// Request to email a registration code.
#[derive(Debug, Deserialize)]
pub struct SendRegistrationOtpRequest {
    pub email: String,
}

/// Request to verify a registration code and create the account.
#[derive(Debug, Deserialize)]
pub struct VerifyRegistrationRequest {
    pub email: String,
    pub otp: String,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub password: String,
}

/// Request to email a password-reset code.
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Request to verify a reset code and set a new password.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub email: String,
    pub otp: String,
    pub new_password: String,
}

// =============================================================================
// Response Types
// =============================================================================

/// Acknowledgement for OTP dispatch and password reset.
#[derive(Debug, Serialize)]
pub struct AuthAck {
    pub success: bool,
    pub message: String,
}

/// Response for a completed registration.
#[derive(Debug, Serialize)]
pub struct RegistrationResponse {
    pub success: bool,
    pub message: String,
    pub user: UserProfile,
}

// =============================================================================
// Registration
// =============================================================================

/// Email a registration code to a new address.
///
/// POST /auth/send-registration-otp
///
/// # Errors
///
/// Returns 409 if the email is already registered, 502 if the email could
/// not be dispatched.
#[instrument(skip(state))]
pub async fn send_registration_otp(
    State(state): State<AppState>,
    Json(req): Json<SendRegistrationOtpRequest>,
) -> Result<Json<AuthAck>, AppError> {
    let auth = AuthService::new(state.pool(), state.otp(), state.mailer());
    auth.send_registration_otp(&req.email).await?;

    Ok(Json(AuthAck {
        success: true,
        message: "OTP sent to your email".to_string(),
    }))
}

/// Verify a registration code and create the account.
///
/// POST /auth/verify-registration
///
/// # Errors
///
/// Returns 401 for a wrong or expired code, 409 if the email got registered
/// meanwhile, 400 for a missing name or weak password.
#[instrument(skip(state, req))]
pub async fn verify_registration(
    State(state): State<AppState>,
    Json(req): Json<VerifyRegistrationRequest>,
) -> Result<Json<RegistrationResponse>, AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::BadRequest("Name is required".to_string()));
    }

    let auth = AuthService::new(state.pool(), state.otp(), state.mailer());
    let user = auth
        .verify_registration(
            &req.email,
            &req.otp,
            req.name.trim(),
            req.phone.as_deref(),
            &req.password,
        )
        .await?;

    Ok(Json(RegistrationResponse {
        success: true,
        message: "Registration successful".to_string(),
        user: UserProfile::from(user),
    }))
}

// =============================================================================
// Password Reset
// =============================================================================

/// Email a password-reset code.
///
/// POST /auth/forgot-password
///
/// The response is identical whether or not the email is registered, so the
/// endpoint cannot be used to probe for accounts.
///
/// # Errors
///
/// Returns 502 if the email could not be dispatched.
#[instrument(skip(state))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Json<AuthAck>, AppError> {
    let auth = AuthService::new(state.pool(), state.otp(), state.mailer());
    auth.forgot_password(&req.email).await?;

    Ok(Json(AuthAck {
        success: true,
        message: "If this email exists, an OTP has been sent".to_string(),
    }))
}

/// Verify a reset code and set the new password.
///
/// POST /auth/reset-password
///
/// # Errors
///
/// Returns 401 for a wrong or expired code, 400 for a weak password.
#[instrument(skip(state, req))]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<AuthAck>, AppError> {
    let auth = AuthService::new(state.pool(), state.otp(), state.mailer());
    auth.reset_password(&req.email, &req.otp, &req.new_password)
        .await?;

    Ok(Json(AuthAck {
        success: true,
        message: "Password reset successfully".to_string(),
    }))
}
