//! Address repository for database operations.
//!
//! The book holds at most [`MAX_ADDRESSES_PER_USER`] addresses per user and
//! keeps exactly one default while any exist. Every mutation that could
//! disturb that runs inside a transaction.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use fabrico_core::{AddressId, AddressType, Phone, Pincode, UserId};

use super::RepositoryError;
use crate::models::address::{Address, ValidatedAddress};

/// Cap on saved addresses per user.
pub const MAX_ADDRESSES_PER_USER: i64 = 3;

#[derive(sqlx::FromRow)]
struct AddressRow {
    id: i64,
    user_id: i64,
    name: String,
    mobile_number: String,
    pincode: String,
    address_line1: String,
    address_line2: Option<String>,
    city: String,
    taluka: Option<String>,
    district: Option<String>,
    state: String,
    landmark: Option<String>,
    alternate_phone: Option<String>,
    address_type: AddressType,
    latitude: Option<f64>,
    longitude: Option<f64>,
    is_default: bool,
    created_at: DateTime<Utc>,
}

impl AddressRow {
    fn into_address(self) -> Result<Address, RepositoryError> {
        let mobile_number = Phone::parse(&self.mobile_number).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid phone in database: {e}"))
        })?;
        let pincode = Pincode::parse(&self.pincode).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid pincode in database: {e}"))
        })?;
        let alternate_phone = self
            .alternate_phone
            .as_deref()
            .map(Phone::parse)
            .transpose()
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid phone in database: {e}"))
            })?;

        Ok(Address {
            id: AddressId::new(self.id),
            user_id: UserId::new(self.user_id),
            name: self.name,
            mobile_number,
            pincode,
            address_line1: self.address_line1,
            address_line2: self.address_line2,
            city: self.city,
            taluka: self.taluka,
            district: self.district,
            state: self.state,
            landmark: self.landmark,
            alternate_phone,
            address_type: self.address_type,
            latitude: self.latitude,
            longitude: self.longitude,
            is_default: self.is_default,
            created_at: self.created_at,
        })
    }
}

const ADDRESS_COLUMNS: &str = "id, user_id, name, mobile_number, pincode, address_line1, \
                               address_line2, city, taluka, district, state, landmark, \
                               alternate_phone, address_type, latitude, longitude, is_default, \
                               created_at";

/// Repository for address database operations.
pub struct AddressRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AddressRepository<'a> {
    /// Create a new address repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// A user's addresses in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<Address>, RepositoryError> {
        let rows = sqlx::query_as::<_, AddressRow>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM addresses WHERE user_id = ?1 ORDER BY created_at, id"
        ))
        .bind(user_id.as_i64())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(AddressRow::into_address).collect()
    }

    /// One address, scoped to its owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn get(
        &self,
        user_id: UserId,
        address_id: AddressId,
    ) -> Result<Option<Address>, RepositoryError> {
        let row = sqlx::query_as::<_, AddressRow>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM addresses WHERE id = ?1 AND user_id = ?2"
        ))
        .bind(address_id.as_i64())
        .bind(user_id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.map(AddressRow::into_address).transpose()
    }

    /// Insert an address. The first address a user saves becomes the
    /// default; the count check and the insert share a transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user already has
    /// [`MAX_ADDRESSES_PER_USER`] addresses. Returns
    /// `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        user_id: UserId,
        address: &ValidatedAddress,
    ) -> Result<Address, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM addresses WHERE user_id = ?1",
        )
        .bind(user_id.as_i64())
        .fetch_one(&mut *tx)
        .await?;

        if count >= MAX_ADDRESSES_PER_USER {
            return Err(RepositoryError::Conflict(
                "address limit reached".to_owned(),
            ));
        }

        let row = sqlx::query_as::<_, AddressRow>(&format!(
            "INSERT INTO addresses \
             (user_id, name, mobile_number, pincode, address_line1, address_line2, city, taluka, \
              district, state, landmark, alternate_phone, address_type, latitude, longitude, \
              is_default, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17) \
             RETURNING {ADDRESS_COLUMNS}"
        ))
        .bind(user_id.as_i64())
        .bind(&address.name)
        .bind(address.mobile_number.as_str())
        .bind(address.pincode.as_str())
        .bind(&address.address_line1)
        .bind(address.address_line2.as_deref())
        .bind(&address.city)
        .bind(address.taluka.as_deref())
        .bind(address.district.as_deref())
        .bind(&address.state)
        .bind(address.landmark.as_deref())
        .bind(address.alternate_phone.as_ref().map(Phone::as_str))
        .bind(address.address_type)
        .bind(address.latitude)
        .bind(address.longitude)
        .bind(count == 0)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        row.into_address()
    }

    /// Replace an address's fields. The default flag is not touched here;
    /// that goes through [`Self::set_default`].
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn update(
        &self,
        user_id: UserId,
        address_id: AddressId,
        address: &ValidatedAddress,
    ) -> Result<Option<Address>, RepositoryError> {
        let row = sqlx::query_as::<_, AddressRow>(&format!(
            "UPDATE addresses SET \
             name = ?1, mobile_number = ?2, pincode = ?3, address_line1 = ?4, \
             address_line2 = ?5, city = ?6, taluka = ?7, district = ?8, state = ?9, \
             landmark = ?10, alternate_phone = ?11, address_type = ?12, latitude = ?13, \
             longitude = ?14 \
             WHERE id = ?15 AND user_id = ?16 \
             RETURNING {ADDRESS_COLUMNS}"
        ))
        .bind(&address.name)
        .bind(address.mobile_number.as_str())
        .bind(address.pincode.as_str())
        .bind(&address.address_line1)
        .bind(address.address_line2.as_deref())
        .bind(&address.city)
        .bind(address.taluka.as_deref())
        .bind(address.district.as_deref())
        .bind(&address.state)
        .bind(address.landmark.as_deref())
        .bind(address.alternate_phone.as_ref().map(Phone::as_str))
        .bind(address.address_type)
        .bind(address.latitude)
        .bind(address.longitude)
        .bind(address_id.as_i64())
        .bind(user_id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.map(AddressRow::into_address).transpose()
    }

    /// Make one address the default, clearing the rest.
    ///
    /// # Returns
    ///
    /// Returns `false` if the address doesn't exist for this user; the
    /// transaction rolls back so the previous default survives.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn set_default(
        &self,
        user_id: UserId,
        address_id: AddressId,
    ) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE addresses SET is_default = 0 WHERE user_id = ?1")
            .bind(user_id.as_i64())
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query(
            "UPDATE addresses SET is_default = 1 WHERE id = ?1 AND user_id = ?2",
        )
        .bind(address_id.as_i64())
        .bind(user_id.as_i64())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            // Dropping the transaction un-clears the defaults.
            return Ok(false);
        }

        tx.commit().await?;

        Ok(true)
    }

    /// Delete an address. When the default goes away and others remain, the
    /// oldest remaining address is promoted inside the same transaction.
    ///
    /// # Returns
    ///
    /// Returns `true` if an address was actually deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn delete(
        &self,
        user_id: UserId,
        address_id: AddressId,
    ) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let was_default = sqlx::query_scalar::<_, bool>(
            "SELECT is_default FROM addresses WHERE id = ?1 AND user_id = ?2",
        )
        .bind(address_id.as_i64())
        .bind(user_id.as_i64())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(was_default) = was_default else {
            return Ok(false);
        };

        sqlx::query("DELETE FROM addresses WHERE id = ?1 AND user_id = ?2")
            .bind(address_id.as_i64())
            .bind(user_id.as_i64())
            .execute(&mut *tx)
            .await?;

        if was_default {
            sqlx::query(
                "UPDATE addresses SET is_default = 1 WHERE id = \
                 (SELECT id FROM addresses WHERE user_id = ?1 ORDER BY created_at, id LIMIT 1)",
            )
            .bind(user_id.as_i64())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(true)
    }
}
