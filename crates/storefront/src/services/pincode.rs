//! Pincode serviceability checks.
//!
//! Registry rows change rarely, so lookups go through a short-TTL
//! read-through cache. Negative lookups are cached too; unknown pincodes are
//! the common case for typos.

use std::time::Duration;

use moka::future::Cache;
use sqlx::SqlitePool;

use fabrico_core::Pincode;

use crate::db::RepositoryError;
use crate::db::pincodes::PincodeRepository;
use crate::models::pincode::{PincodeCheck, PincodeEntry};

/// How long a registry lookup stays cached.
const CACHE_TTL: Duration = Duration::from_secs(60);

/// Shared lookup cache, keyed by the six digits.
pub type PincodeCache = Cache<String, Option<PincodeEntry>>;

/// Build the shared pincode cache. Created once at startup and handed to
/// every [`PincodeService`].
#[must_use]
pub fn pincode_cache() -> PincodeCache {
    Cache::builder()
        .max_capacity(10_000)
        .time_to_live(CACHE_TTL)
        .build()
}

/// Serviceability lookups against the pincode registry.
pub struct PincodeService<'a> {
    pincodes: PincodeRepository<'a>,
    cache: &'a PincodeCache,
}

impl<'a> PincodeService<'a> {
    /// Create a new pincode service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool, cache: &'a PincodeCache) -> Self {
        Self {
            pincodes: PincodeRepository::new(pool),
            cache,
        }
    }

    /// Answer a serviceability check for client-submitted input.
    ///
    /// Malformed input is reported the same way as an unknown pincode, the
    /// client only cares whether it can deliver there.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the database operation fails.
    pub async fn check(&self, raw: &str) -> Result<PincodeCheck, RepositoryError> {
        let Ok(pincode) = Pincode::parse(raw) else {
            return Ok(PincodeCheck::not_serviceable());
        };

        let entry = self.lookup(&pincode).await?;
        Ok(entry
            .filter(|e| e.delivery_available)
            .map_or_else(PincodeCheck::not_serviceable, |e| {
                PincodeCheck::serviceable(&e)
            }))
    }

    /// Cached registry lookup.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the database operation fails.
    pub async fn lookup(
        &self,
        pincode: &Pincode,
    ) -> Result<Option<PincodeEntry>, RepositoryError> {
        let key = pincode.as_str().to_string();

        if let Some(cached) = self.cache.get(&key).await {
            return Ok(cached);
        }

        let entry = self.pincodes.find(pincode).await?;
        self.cache.insert(key, entry.clone()).await;
        Ok(entry)
    }
}
