//! Phone number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum PhoneError {
    /// The input is not exactly ten digits long.
    #[error("phone number must be exactly 10 digits")]
    WrongLength,
    /// The input contains a non-digit character.
    #[error("phone number must contain only digits")]
    NonDigit,
}

/// A ten-digit mobile number.
///
/// Shipping and contact numbers are collected as bare national numbers
/// without a country prefix, so the only accepted shape is ten ASCII digits.
/// Common separators (spaces, dashes) are stripped before validation.
///
/// ## Examples
///
/// ```
/// use fabrico_core::Phone;
///
/// assert!(Phone::parse("9876543210").is_ok());
/// assert!(Phone::parse("98765 43210").is_ok()); // separators stripped
///
/// assert!(Phone::parse("12345").is_err());      // too short
/// assert!(Phone::parse("987654321x").is_err()); // non-digit
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Number of digits in a valid phone number.
    pub const LENGTH: usize = 10;

    /// Parse a `Phone` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input, after stripping spaces and dashes,
    /// is not exactly ten ASCII digits.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let cleaned: String = s.chars().filter(|c| !matches!(c, ' ' | '-')).collect();

        if cleaned.chars().any(|c| !c.is_ascii_digit()) {
            return Err(PhoneError::NonDigit);
        }

        if cleaned.len() != Self::LENGTH {
            return Err(PhoneError::WrongLength);
        }

        Ok(Self(cleaned))
    }

    /// Returns the phone number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Phone` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Phone {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Phone {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with sqlite feature)
#[cfg(feature = "sqlite")]
impl sqlx::Type<sqlx::Sqlite> for Phone {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <String as sqlx::Type<sqlx::Sqlite>>::type_info()
    }

    fn compatible(ty: &sqlx::sqlite::SqliteTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Sqlite>>::compatible(ty)
    }
}

#[cfg(feature = "sqlite")]
impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for Phone {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(s))
    }
}

#[cfg(feature = "sqlite")]
impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for Phone {
    fn encode_by_ref(
        &self,
        buf: &mut <sqlx::Sqlite as sqlx::Database>::ArgumentBuffer<'q>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<'q, sqlx::Sqlite>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert!(Phone::parse("9876543210").is_ok());
        assert!(Phone::parse("6000000000").is_ok());
    }

    #[test]
    fn test_parse_strips_separators() {
        let phone = Phone::parse("98765-43210").unwrap();
        assert_eq!(phone.as_str(), "9876543210");
        let phone = Phone::parse("98765 43210").unwrap();
        assert_eq!(phone.as_str(), "9876543210");
    }

    #[test]
    fn test_parse_wrong_length() {
        assert!(matches!(Phone::parse("12345"), Err(PhoneError::WrongLength)));
        assert!(matches!(
            Phone::parse("98765432100"),
            Err(PhoneError::WrongLength)
        ));
        assert!(matches!(Phone::parse(""), Err(PhoneError::WrongLength)));
    }

    #[test]
    fn test_parse_non_digit() {
        assert!(matches!(
            Phone::parse("98765432ab"),
            Err(PhoneError::NonDigit)
        ));
        assert!(matches!(
            Phone::parse("+919876543210"),
            Err(PhoneError::NonDigit)
        ));
    }

    #[test]
    fn test_serde_is_transparent() {
        let phone = Phone::parse("9876543210").unwrap();
        assert_eq!(
            serde_json::to_string(&phone).unwrap(),
            "\"9876543210\""
        );
    }
}
