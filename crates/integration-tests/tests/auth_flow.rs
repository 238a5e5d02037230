//! Registration, login, and password-reset flows.
//!
//! Registration and reset are OTP-gated. These tests pull the codes out of
//! the in-memory outbox, so they cover the full path from dispatch to
//! verification including the single-use and validation-before-consume
//! rules.

use axum::http::StatusCode;
use serde_json::json;

use fabrico_integration_tests::TestContext;

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn test_registration_creates_verified_account() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx
        .post(
            "/auth/send-registration-otp",
            &json!({ "email": "asha@example.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "OTP sent to your email");

    let sent = ctx.outbox.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "asha@example.com");
    assert_eq!(sent[0].subject, "Your Fabrico verification code");

    let otp = ctx.last_otp_for("asha@example.com");
    let (status, body) = ctx
        .post(
            "/auth/verify-registration",
            &json!({
                "email": "asha@example.com",
                "otp": otp,
                "name": "Asha Patil",
                "phone": "9876543210",
                "password": "correct horse",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Registration successful");

    let user = &body["user"];
    assert!(user["id"].as_i64().expect("User id is numeric") > 0);
    assert_eq!(user["name"], "Asha Patil");
    assert_eq!(user["email"], "asha@example.com");
    assert_eq!(user["phone"], "9876543210");
    assert_eq!(user["isVerified"], true);
    // Registration does not start a session.
    assert_eq!(user["isLoggedIn"], false);
    assert_eq!(user["unseenCartCount"], 0);
    assert!(user["createdAt"].is_string());
}

#[tokio::test]
async fn test_wrong_otp_rejected_without_burning_the_code() {
    let ctx = TestContext::new().await;

    let (status, _) = ctx
        .post(
            "/auth/send-registration-otp",
            &json!({ "email": "asha@example.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // Codes are drawn from 100000..=999999, so this can never match.
    let (status, body) = ctx
        .post(
            "/auth/verify-registration",
            &json!({
                "email": "asha@example.com",
                "otp": "000000",
                "name": "Asha Patil",
                "password": "correct horse",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid OTP");

    // A mismatch leaves the stored code intact.
    let otp = ctx.last_otp_for("asha@example.com");
    let (status, _) = ctx
        .post(
            "/auth/verify-registration",
            &json!({
                "email": "asha@example.com",
                "otp": otp,
                "name": "Asha Patil",
                "password": "correct horse",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_registration_otp_is_single_use() {
    let ctx = TestContext::new().await;
    ctx.register_user("Asha Patil", "asha@example.com", "correct horse")
        .await;

    let otp = ctx.last_otp_for("asha@example.com");
    let (status, body) = ctx
        .post(
            "/auth/verify-registration",
            &json!({
                "email": "asha@example.com",
                "otp": otp,
                "name": "Asha Patil",
                "password": "correct horse",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "OTP expired");
}

#[tokio::test]
async fn test_send_otp_rejects_registered_email() {
    let ctx = TestContext::new().await;
    ctx.register_user("Asha Patil", "asha@example.com", "correct horse")
        .await;

    let (status, body) = ctx
        .post(
            "/auth/send-registration-otp",
            &json!({ "email": "asha@example.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "An account with this email already exists");
}

#[tokio::test]
async fn test_send_otp_rejects_malformed_email() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx
        .post(
            "/auth/send-registration-otp",
            &json!({ "email": "not-an-address" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid email address");
    assert!(ctx.outbox.sent().is_empty());
}

#[tokio::test]
async fn test_weak_password_rejected_before_the_code_is_consumed() {
    let ctx = TestContext::new().await;

    let (status, _) = ctx
        .post(
            "/auth/send-registration-otp",
            &json!({ "email": "asha@example.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let otp = ctx.last_otp_for("asha@example.com");
    let (status, body) = ctx
        .post(
            "/auth/verify-registration",
            &json!({
                "email": "asha@example.com",
                "otp": otp,
                "name": "Asha Patil",
                "password": "short",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Password must be at least 8 characters");

    // The rejected attempt must not have spent the code.
    let (status, _) = ctx
        .post(
            "/auth/verify-registration",
            &json!({
                "email": "asha@example.com",
                "otp": otp,
                "name": "Asha Patil",
                "password": "long enough now",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_blank_name_rejected_before_the_code_is_consumed() {
    let ctx = TestContext::new().await;

    let (status, _) = ctx
        .post(
            "/auth/send-registration-otp",
            &json!({ "email": "asha@example.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let otp = ctx.last_otp_for("asha@example.com");
    let (status, body) = ctx
        .post(
            "/auth/verify-registration",
            &json!({
                "email": "asha@example.com",
                "otp": otp,
                "name": "   ",
                "password": "correct horse",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Name is required");

    let (status, _) = ctx
        .post(
            "/auth/verify-registration",
            &json!({
                "email": "asha@example.com",
                "otp": otp,
                "name": "Asha Patil",
                "password": "correct horse",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

// ============================================================================
// Login and Logout
// ============================================================================

#[tokio::test]
async fn test_login_marks_user_logged_in() {
    let ctx = TestContext::new().await;
    let user_id = ctx
        .register_user("Asha Patil", "asha@example.com", "correct horse")
        .await;

    let (status, body) = ctx
        .post(
            "/users/login",
            &json!({ "identifier": "asha@example.com", "password": "correct horse" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], user_id);
    assert_eq!(body["isLoggedIn"], true);
    assert_eq!(body["unseenCartCount"], 0);
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let ctx = TestContext::new().await;
    ctx.register_user("Asha Patil", "asha@example.com", "correct horse")
        .await;

    let (status, body) = ctx
        .post(
            "/users/login",
            &json!({ "identifier": "asha@example.com", "password": "wrong horse" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");

    // Unknown emails get the same answer as wrong passwords.
    let (status, body) = ctx
        .post(
            "/users/login",
            &json!({ "identifier": "nobody@example.com", "password": "correct horse" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
async fn test_logout_ends_the_session() {
    let ctx = TestContext::new().await;
    let user_id = ctx
        .register_and_login("Asha Patil", "asha@example.com", "correct horse")
        .await;

    let (status, body) = ctx.post_empty(&format!("/users/logout/{user_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    // Cart access is gated on the login flag.
    let (status, body) = ctx.get(&format!("/cart/{user_id}")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Please log in first");
}

#[tokio::test]
async fn test_logout_unknown_user_is_404() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx.post_empty("/users/logout/424242").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");
}

#[tokio::test]
async fn test_login_status_toggles_cart_access() {
    let ctx = TestContext::new().await;
    let user_id = ctx
        .register_user("Asha Patil", "asha@example.com", "correct horse")
        .await;

    let (status, body) = ctx
        .put(
            &format!("/users/{user_id}/login-status"),
            &json!({ "isLoggedIn": true }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isLoggedIn"], true);

    let (status, _) = ctx.get(&format!("/cart/{user_id}")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = ctx
        .put(
            &format!("/users/{user_id}/login-status"),
            &json!({ "isLoggedIn": false }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isLoggedIn"], false);

    let (status, _) = ctx.get(&format!("/cart/{user_id}")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_check_email_probe() {
    let ctx = TestContext::new().await;
    ctx.register_user("Asha Patil", "asha@example.com", "correct horse")
        .await;

    let (status, body) = ctx.get("/users/check-email?email=asha@example.com").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "exists": true }));

    let (status, body) = ctx.get("/users/check-email?email=other@example.com").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "exists": false }));

    // Malformed input answers false instead of erroring.
    let (status, body) = ctx.get("/users/check-email?email=not-an-address").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "exists": false }));
}

// ============================================================================
// Password Reset
// ============================================================================

#[tokio::test]
async fn test_password_reset_flow() {
    let ctx = TestContext::new().await;
    ctx.register_user("Asha Patil", "asha@example.com", "correct horse")
        .await;

    let (status, body) = ctx
        .post("/auth/forgot-password", &json!({ "email": "asha@example.com" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "If this email exists, an OTP has been sent");

    let sent = ctx.outbox.sent();
    let reset_mail = sent.last().expect("Reset email was sent");
    assert_eq!(reset_mail.subject, "Reset your Fabrico password");

    let otp = ctx.last_otp_for("asha@example.com");
    let (status, body) = ctx
        .post(
            "/auth/reset-password",
            &json!({
                "email": "asha@example.com",
                "otp": otp,
                "newPassword": "fresh password",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Password reset successfully");

    let (status, _) = ctx
        .post(
            "/users/login",
            &json!({ "identifier": "asha@example.com", "password": "correct horse" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = ctx
        .post(
            "/users/login",
            &json!({ "identifier": "asha@example.com", "password": "fresh password" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_forgot_password_does_not_reveal_accounts() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx
        .post(
            "/auth/forgot-password",
            &json!({ "email": "nobody@example.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "If this email exists, an OTP has been sent");
    // Same acknowledgement, but nothing was dispatched.
    assert!(ctx.outbox.sent().is_empty());
}

#[tokio::test]
async fn test_reset_rejects_wrong_otp() {
    let ctx = TestContext::new().await;
    ctx.register_user("Asha Patil", "asha@example.com", "correct horse")
        .await;

    let (status, _) = ctx
        .post("/auth/forgot-password", &json!({ "email": "asha@example.com" }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = ctx
        .post(
            "/auth/reset-password",
            &json!({
                "email": "asha@example.com",
                "otp": "000000",
                "newPassword": "fresh password",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid OTP");

    let otp = ctx.last_otp_for("asha@example.com");
    let (status, _) = ctx
        .post(
            "/auth/reset-password",
            &json!({
                "email": "asha@example.com",
                "otp": otp,
                "newPassword": "fresh password",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

// ============================================================================
// Rate Limiting
// ============================================================================

#[tokio::test]
async fn test_login_flood_hits_the_rate_limit() {
    let ctx = TestContext::new().await;

    // Malformed identifiers are rejected before any password work, so the
    // burst completes well inside the replenish interval.
    let mut limited = 0;
    for _ in 0..12 {
        let (status, _) = ctx
            .post(
                "/users/login",
                &json!({ "identifier": "not-an-address", "password": "whatever" }),
            )
            .await;
        if status == StatusCode::TOO_MANY_REQUESTS {
            limited += 1;
        } else {
            assert_eq!(status, StatusCode::UNAUTHORIZED);
        }
    }

    assert!(limited > 0, "Expected the flood to trip the limiter");
}
