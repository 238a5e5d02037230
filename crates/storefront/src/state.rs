//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::StorefrontConfig;
use crate::services::auth::OtpStore;
use crate::services::email::Mailer;
use crate::services::pincode::PincodeCache;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: SqlitePool,
    mailer: Mailer,
    otp: OtpStore,
    pincode_cache: PincodeCache,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(
        config: StorefrontConfig,
        pool: SqlitePool,
        mailer: Mailer,
        otp: OtpStore,
        pincode_cache: PincodeCache,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                mailer,
                otp,
                pincode_cache,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.inner.pool
    }

    /// Get a reference to the email delivery backend.
    #[must_use]
    pub fn mailer(&self) -> &Mailer {
        &self.inner.mailer
    }

    /// Get a reference to the one-time password store.
    #[must_use]
    pub fn otp(&self) -> &OtpStore {
        &self.inner.otp
    }

    /// Get a reference to the pincode lookup cache.
    #[must_use]
    pub fn pincode_cache(&self) -> &PincodeCache {
        &self.inner.pincode_cache
    }
}
