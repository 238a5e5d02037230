//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness probe
//! GET  /health/ready           - Readiness probe (checks the database)
//!
//! # Products
//! GET  /products               - Product listing
//! GET  /products/{id}          - Product detail with per-variant COD
//!
//! # Cart
//! POST /cart/add               - Add a product (quantity 1)
//! POST /cart/remove            - Remove a product (idempotent)
//! PUT  /cart/update            - Change a line's quantity
//! PUT  /cart/update-variant    - Switch a line to another color variant
//! GET  /cart/{userId}          - Cart snapshot resolved against the catalog
//! POST /cart/{userId}/seen     - Mark the cart viewed (resets the badge)
//!
//! # Addresses
//! GET    /address/{userId}/addresses              - List saved addresses
//! POST   /address/{userId}/addresses              - Save a new address
//! PUT    /address/{userId}/addresses/{id}         - Update an address
//! PUT    /address/{userId}/addresses/{id}/default - Make an address the default
//! DELETE /address/{userId}/addresses/{id}         - Delete an address
//!
//! # Pincodes
//! GET  /pincodes/check/{pincode} - Delivery serviceability check
//!
//! # Auth
//! POST /auth/send-registration-otp - Email a registration code
//! POST /auth/verify-registration   - Verify the code and create the account
//! POST /auth/forgot-password       - Email a password-reset code
//! POST /auth/reset-password        - Verify the code and set a new password
//!
//! # Users
//! POST /users/login                 - Password login
//! POST /users/logout/{userId}       - Logout
//! PUT  /users/{userId}/login-status - Set the login flag directly
//! GET  /users/check-email?email=    - Registered-email probe
//!
//! # Checkout
//! POST /checkout               - Place an order over the current cart
//! ```

pub mod address;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod pincodes;
pub mod products;
pub mod users;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/send-registration-otp", post(auth::send_registration_otp))
        .route("/verify-registration", post(auth::verify_registration))
        .route("/forgot-password", post(auth::forgot_password))
        .route("/reset-password", post(auth::reset_password))
}

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(users::login))
        .route("/logout/{user_id}", post(users::logout))
        .route("/{user_id}/login-status", put(users::set_login_status))
        .route("/check-email", get(users::check_email))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/add", post(cart::add))
        .route("/remove", post(cart::remove))
        .route("/update", put(cart::update))
        .route("/update-variant", put(cart::update_variant))
        .route("/{user_id}", get(cart::show))
        .route("/{user_id}/seen", post(cart::mark_seen))
}

/// Create the address routes router.
pub fn address_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/{user_id}/addresses",
            get(address::index).post(address::create),
        )
        .route(
            "/{user_id}/addresses/{id}",
            put(address::update).delete(address::delete),
        )
        .route(
            "/{user_id}/addresses/{id}/default",
            put(address::set_default),
        )
}

/// Create the pincode routes router.
pub fn pincode_routes() -> Router<AppState> {
    Router::new().route("/check/{pincode}", get(pincodes::check))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Product routes
        .nest("/products", product_routes())
        // Cart routes
        .nest("/cart", cart_routes())
        // Address routes
        .nest("/address", address_routes())
        // Pincode routes
        .nest("/pincodes", pincode_routes())
        // Credential endpoints get the strict limiter
        .nest("/auth", auth_routes().layer(auth_rate_limiter()))
        .nest("/users", user_routes().layer(auth_rate_limiter()))
        // Checkout
        .route("/checkout", post(checkout::place_order))
}
