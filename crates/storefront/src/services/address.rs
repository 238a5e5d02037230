//! Address book service.
//!
//! Client payloads arrive as raw strings and are parsed here before anything
//! is stored. The pincode must be serviceable; locality fields are filled
//! from the registry when the client omits them, submitted values win.

use sqlx::SqlitePool;
use thiserror::Error;

use fabrico_core::{AddressId, Phone, Pincode, UserId};

use crate::db::RepositoryError;
use crate::db::addresses::AddressRepository;
use crate::db::users::UserRepository;
use crate::models::address::{Address, NewAddress, ValidatedAddress};
use crate::services::pincode::{PincodeCache, PincodeService};

/// Errors that can occur during address operations.
#[derive(Debug, Error)]
pub enum AddressError {
    /// User not found.
    #[error("user not found")]
    UserNotFound,

    /// Address not found or not owned by the user.
    #[error("address not found")]
    NotFound,

    /// The user already holds the maximum number of addresses.
    #[error("address limit reached")]
    LimitReached,

    /// A field failed validation.
    #[error("invalid address: {0}")]
    Validation(String),

    /// The pincode is unknown or outside the delivery area.
    #[error("delivery not available for this pincode")]
    NotServiceable,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Address book operations for a single user.
pub struct AddressService<'a> {
    users: UserRepository<'a>,
    addresses: AddressRepository<'a>,
    pincodes: PincodeService<'a>,
}

impl<'a> AddressService<'a> {
    /// Create a new address service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool, cache: &'a PincodeCache) -> Self {
        Self {
            users: UserRepository::new(pool),
            addresses: AddressRepository::new(pool),
            pincodes: PincodeService::new(pool, cache),
        }
    }

    /// A user's saved addresses, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `AddressError::UserNotFound` if the user doesn't exist.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<Address>, AddressError> {
        self.require_user(user_id).await?;
        Ok(self.addresses.list(user_id).await?)
    }

    /// Save a new address. The first saved address becomes the default.
    ///
    /// # Errors
    ///
    /// Returns `AddressError::LimitReached` when the user already has the
    /// maximum number of addresses, `AddressError::Validation` or
    /// `AddressError::NotServiceable` on bad input.
    pub async fn add(&self, user_id: UserId, new: &NewAddress) -> Result<Address, AddressError> {
        self.require_user(user_id).await?;
        let validated = self.validate(new).await?;

        self.addresses
            .create(user_id, &validated)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AddressError::LimitReached,
                other => AddressError::Repository(other),
            })
    }

    /// Replace an address's fields. The default flag is not touched here;
    /// that goes through [`Self::set_default`].
    ///
    /// # Errors
    ///
    /// Returns `AddressError::NotFound` if the address doesn't exist or
    /// belongs to someone else.
    pub async fn update(
        &self,
        user_id: UserId,
        address_id: AddressId,
        new: &NewAddress,
    ) -> Result<Address, AddressError> {
        self.require_user(user_id).await?;
        let validated = self.validate(new).await?;

        self.addresses
            .update(user_id, address_id, &validated)
            .await?
            .ok_or(AddressError::NotFound)
    }

    /// Make an address the user's default. Returns the updated list.
    ///
    /// # Errors
    ///
    /// Returns `AddressError::NotFound` if the address doesn't exist or
    /// belongs to someone else.
    pub async fn set_default(
        &self,
        user_id: UserId,
        address_id: AddressId,
    ) -> Result<Vec<Address>, AddressError> {
        self.require_user(user_id).await?;

        if !self.addresses.set_default(user_id, address_id).await? {
            return Err(AddressError::NotFound);
        }

        Ok(self.addresses.list(user_id).await?)
    }

    /// Delete an address. When the default is deleted and others remain, the
    /// oldest remaining one becomes the default. Returns the updated list.
    ///
    /// # Errors
    ///
    /// Returns `AddressError::NotFound` if the address doesn't exist or
    /// belongs to someone else.
    pub async fn delete(
        &self,
        user_id: UserId,
        address_id: AddressId,
    ) -> Result<Vec<Address>, AddressError> {
        self.require_user(user_id).await?;

        if !self.addresses.delete(user_id, address_id).await? {
            return Err(AddressError::NotFound);
        }

        Ok(self.addresses.list(user_id).await?)
    }

    // ===== Helper Functions =====

    async fn require_user(&self, user_id: UserId) -> Result<(), AddressError> {
        self.users
            .get_by_id(user_id)
            .await?
            .ok_or(AddressError::UserNotFound)?;
        Ok(())
    }

    /// Parse and validate a submitted address.
    ///
    /// A registry read failure counts as not serviceable.
    async fn validate(&self, new: &NewAddress) -> Result<ValidatedAddress, AddressError> {
        let name = new.name.trim();
        if name.is_empty() {
            return Err(AddressError::Validation("Name is required".to_string()));
        }

        let address_line1 = new.address_line1.trim();
        if address_line1.is_empty() {
            return Err(AddressError::Validation(
                "Address line is required".to_string(),
            ));
        }

        let mobile_number = Phone::parse(&new.mobile_number)
            .map_err(|e| AddressError::Validation(e.to_string()))?;
        let alternate_phone = new
            .alternate_phone
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(Phone::parse)
            .transpose()
            .map_err(|e| AddressError::Validation(e.to_string()))?;
        let pincode =
            Pincode::parse(&new.pincode).map_err(|e| AddressError::Validation(e.to_string()))?;

        let entry = match self.pincodes.lookup(&pincode).await {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    pincode = %pincode.as_str(),
                    "Registry lookup failed, treating pincode as not serviceable"
                );
                None
            }
        };
        let entry = entry
            .filter(|e| e.delivery_available)
            .ok_or(AddressError::NotServiceable)?;

        Ok(ValidatedAddress {
            name: name.to_string(),
            mobile_number,
            pincode,
            address_line1: address_line1.to_string(),
            address_line2: trimmed(new.address_line2.as_deref()),
            city: trimmed(new.city.as_deref()).unwrap_or_else(|| entry.city.clone()),
            taluka: trimmed(new.taluka.as_deref()).or_else(|| Some(entry.taluka.clone())),
            district: trimmed(new.district.as_deref()).or_else(|| Some(entry.district.clone())),
            state: trimmed(new.state.as_deref()).unwrap_or_else(|| entry.state.clone()),
            landmark: trimmed(new.landmark.as_deref()),
            alternate_phone,
            address_type: new.address_type,
            latitude: new.latitude,
            longitude: new.longitude,
        })
    }
}

/// Trim an optional field, turning whitespace-only input into `None`.
fn trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_trimmed_drops_blank_input() {
        assert_eq!(trimmed(None), None);
        assert_eq!(trimmed(Some("")), None);
        assert_eq!(trimmed(Some("   ")), None);
        assert_eq!(trimmed(Some("  Sangli ")), Some("Sangli".to_string()));
    }
}
