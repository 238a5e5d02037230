//! Integration tests for the Fabrico storefront.
//!
//! Each test stands up its own [`TestContext`]: an in-memory `SQLite`
//! database with migrations applied, the full route stack, and the in-memory
//! mailer so OTP codes can be read back out of the outbox.
//!
//! Requests go through `tower::ServiceExt::oneshot`, so the middleware runs
//! without binding a socket. Every request carries an `X-Forwarded-For`
//! header because the rate limiter wants a client IP and oneshot requests
//! have no peer address.
//!
//! Registry lookups are cached (misses included), so tests seed their
//! pincodes before the first request that touches them.

use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde_json::{Value, json};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tower::ServiceExt;

use fabrico_core::{Category, ColorToken, Pincode};
use fabrico_storefront::config::StorefrontConfig;
use fabrico_storefront::db::{MIGRATOR, PincodeRepository, ProductRepository};
use fabrico_storefront::models::catalog::{NewProduct, NewVariant, Product};
use fabrico_storefront::models::pincode::PincodeEntry;
use fabrico_storefront::routes;
use fabrico_storefront::services::{Mailer, MemoryMailer, OtpStore, pincode_cache};
use fabrico_storefront::state::AppState;

/// Client IP stamped on every test request for the rate limiter.
pub const TEST_CLIENT_IP: &str = "203.0.113.7";

/// An in-process storefront backed by an in-memory database.
///
/// The rate limiter state lives inside the router, so every context starts
/// with a full token bucket.
pub struct TestContext {
    pub router: Router,
    pub pool: SqlitePool,
    pub outbox: MemoryMailer,
}

impl TestContext {
    /// Stand up a fresh storefront instance.
    ///
    /// # Panics
    ///
    /// Panics if the database cannot be created or migrated.
    pub async fn new() -> Self {
        // A single connection: every connection string of sqlite::memory:
        // opens its own database.
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .expect("Failed to parse connection string")
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .expect("Failed to open in-memory database");

        MIGRATOR.run(&pool).await.expect("Failed to run migrations");

        let outbox = MemoryMailer::new();
        let state = AppState::new(
            test_config(),
            pool.clone(),
            Mailer::Memory(outbox.clone()),
            OtpStore::new(),
            pincode_cache(),
        );

        Self {
            router: routes::routes().with_state(state),
            pool,
            outbox,
        }
    }

    // ===== Requests =====

    /// GET `path`, returning the status and decoded JSON body.
    pub async fn get(&self, path: &str) -> (StatusCode, Value) {
        self.request(Method::GET, path, None).await
    }

    /// POST a JSON body to `path`.
    pub async fn post(&self, path: &str, body: &Value) -> (StatusCode, Value) {
        self.request(Method::POST, path, Some(body)).await
    }

    /// POST with no body, for endpoints that take everything from the path.
    pub async fn post_empty(&self, path: &str) -> (StatusCode, Value) {
        self.request(Method::POST, path, None).await
    }

    /// PUT a JSON body to `path`.
    pub async fn put(&self, path: &str, body: &Value) -> (StatusCode, Value) {
        self.request(Method::PUT, path, Some(body)).await
    }

    /// DELETE `path`.
    pub async fn delete(&self, path: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, path, None).await
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder()
            .method(method)
            .uri(path)
            .header("x-forwarded-for", TEST_CLIENT_IP);

        let request = match body {
            Some(payload) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::to_vec(payload).expect("Failed to serialize request body"),
                )),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");

        // Rate-limited responses carry a plain text body; report those as null
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        (status, body)
    }

    // ===== Outbox =====

    /// The latest OTP emailed to `email`.
    ///
    /// # Panics
    ///
    /// Panics if no email with a six-digit code went to the address.
    #[must_use]
    pub fn last_otp_for(&self, email: &str) -> String {
        let sent = self.outbox.sent();
        let mail = sent
            .iter()
            .rev()
            .find(|m| m.to == email)
            .unwrap_or_else(|| panic!("No email in the outbox for {email}"));

        mail.body
            .split(|c: char| !c.is_ascii_digit())
            .find(|run| run.len() == 6)
            .unwrap_or_else(|| panic!("No six-digit code in the email to {email}"))
            .to_string()
    }

    // ===== Seeding =====

    /// Insert a product the way the seeding CLI does.
    ///
    /// # Panics
    ///
    /// Panics if the insert fails.
    pub async fn seed_product(&self, new: &NewProduct) -> Product {
        ProductRepository::new(&self.pool)
            .create(new)
            .await
            .expect("Failed to seed product")
    }

    /// Add a registry entry for a pincode.
    ///
    /// # Panics
    ///
    /// Panics if the upsert fails.
    pub async fn seed_pincode(&self, entry: &PincodeEntry) {
        PincodeRepository::new(&self.pool)
            .upsert(entry)
            .await
            .expect("Failed to seed pincode");
    }

    // ===== Journeys =====

    /// Run the OTP registration flow. The account is created logged out.
    ///
    /// # Panics
    ///
    /// Panics if any step of the flow fails.
    pub async fn register_user(&self, name: &str, email: &str, password: &str) -> i64 {
        let (status, _) = self
            .post("/auth/send-registration-otp", &json!({ "email": email }))
            .await;
        assert_eq!(status, StatusCode::OK, "Failed to send registration OTP");

        let otp = self.last_otp_for(email);
        let (status, body) = self
            .post(
                "/auth/verify-registration",
                &json!({
                    "email": email,
                    "otp": otp,
                    "name": name,
                    "password": password,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "Failed to verify registration");

        body["user"]["id"]
            .as_i64()
            .expect("Registration response carries the user id")
    }

    /// Register and log in. Returns the user's ID.
    ///
    /// # Panics
    ///
    /// Panics if registration or login fails.
    pub async fn register_and_login(&self, name: &str, email: &str, password: &str) -> i64 {
        let user_id = self.register_user(name, email, password).await;

        let (status, _) = self
            .post(
                "/users/login",
                &json!({ "identifier": email, "password": password }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "Failed to log in");

        user_id
    }

    /// Save an address through the API. Returns the new address ID.
    ///
    /// # Panics
    ///
    /// Panics if the address is rejected.
    pub async fn create_address(&self, user_id: i64, pincode: &str) -> i64 {
        let (status, body) = self
            .post(
                &format!("/address/{user_id}/addresses"),
                &address_payload(pincode),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "Failed to save address");

        body["id"].as_i64().expect("Address response carries the id")
    }
}

// ===== Fixtures =====

/// Colors assigned to variants in position order.
const VARIANT_COLORS: &[&str] = &["navy", "olive", "maroon", "teal", "black"];

/// A catalog product at 499.00 with one variant per stock entry.
///
/// # Panics
///
/// Panics if a fixture value fails domain validation.
#[must_use]
pub fn test_product(name: &str, stocks: &[i64]) -> NewProduct {
    let variants = VARIANT_COLORS
        .iter()
        .cycle()
        .zip(stocks.iter().copied())
        .enumerate()
        .map(|(position, (color, quantity))| NewVariant {
            color: ColorToken::parse(color).expect("Fixture color is a CSS token"),
            quantity,
            images: vec![format!("https://cdn.fabrico.shop/test/{position}.jpg")],
            cod_available: None,
        })
        .collect();

    NewProduct {
        name: name.to_string(),
        description: Some(format!("{name} from the test catalog")),
        price: Decimal::new(49900, 2),
        category: Category::Men,
        sub_category: "Shirts".to_string(),
        cod_available: true,
        sizes: vec!["S".to_string(), "M".to_string(), "L".to_string()],
        variants,
    }
}

/// A deliverable registry entry for `code`.
///
/// # Panics
///
/// Panics if `code` is not a valid pincode.
#[must_use]
pub fn serviceable_pincode(code: &str) -> PincodeEntry {
    PincodeEntry {
        pincode: Pincode::parse(code).expect("Fixture pincode is valid"),
        city: "Sangli".to_string(),
        taluka: "Miraj".to_string(),
        district: "Sangli".to_string(),
        state: "Maharashtra".to_string(),
        delivery_available: true,
    }
}

/// Minimal valid address payload for `pincode`. Locality fields are left to
/// the registry backfill.
#[must_use]
pub fn address_payload(pincode: &str) -> Value {
    json!({
        "name": "Asha Patil",
        "mobileNumber": "9876543210",
        "pincode": pincode,
        "addressLine1": "14 Mill Road",
    })
}

fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        database_url: SecretString::from("sqlite::memory:"),
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        allowed_origins: vec!["http://localhost:5173".to_string()],
        smtp: None,
        sentry_dsn: None,
        sentry_environment: "test".to_string(),
        sentry_sample_rate: 0.0,
        sentry_traces_sample_rate: 0.0,
    }
}
