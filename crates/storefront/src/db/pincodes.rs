//! Pincode registry repository.

use sqlx::SqlitePool;

use fabrico_core::Pincode;

use super::RepositoryError;
use crate::models::pincode::PincodeEntry;

#[derive(sqlx::FromRow)]
struct PincodeRow {
    pincode: String,
    city: String,
    taluka: String,
    district: String,
    state: String,
    delivery_available: bool,
}

impl PincodeRow {
    fn into_entry(self) -> Result<PincodeEntry, RepositoryError> {
        let pincode = Pincode::parse(&self.pincode).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid pincode in database: {e}"))
        })?;

        Ok(PincodeEntry {
            pincode,
            city: self.city,
            taluka: self.taluka,
            district: self.district,
            state: self.state,
            delivery_available: self.delivery_available,
        })
    }
}

/// Repository for the serviceable-pincode registry.
pub struct PincodeRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> PincodeRepository<'a> {
    /// Create a new pincode repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Look up a registry entry by pincode.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn find(&self, pincode: &Pincode) -> Result<Option<PincodeEntry>, RepositoryError> {
        let row = sqlx::query_as::<_, PincodeRow>(
            "SELECT pincode, city, taluka, district, state, delivery_available \
             FROM pincodes WHERE pincode = ?1",
        )
        .bind(pincode.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(PincodeRow::into_entry).transpose()
    }

    /// Insert or refresh a registry entry. Used by the seeding CLI.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert(&self, entry: &PincodeEntry) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO pincodes (pincode, city, taluka, district, state, delivery_available) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
             ON CONFLICT(pincode) DO UPDATE SET \
             city = excluded.city, taluka = excluded.taluka, district = excluded.district, \
             state = excluded.state, delivery_available = excluded.delivery_available",
        )
        .bind(entry.pincode.as_str())
        .bind(&entry.city)
        .bind(&entry.taluka)
        .bind(&entry.district)
        .bind(&entry.state)
        .bind(entry.delivery_available)
        .execute(self.pool)
        .await?;

        Ok(())
    }
}
