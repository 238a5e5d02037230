//! Postal pincode type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Pincode`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum PincodeError {
    /// The input is not exactly six digits long.
    #[error("pincode must be exactly 6 digits")]
    WrongLength,
    /// The input contains a non-digit character.
    #[error("pincode must contain only digits")]
    NonDigit,
    /// The input starts with a zero.
    #[error("pincode cannot start with 0")]
    LeadingZero,
}

/// A six-digit Indian postal pincode.
///
/// Valid pincodes are six ASCII digits with a non-zero first digit. The
/// value is kept as a string, matching how it travels in JSON and in the
/// database.
///
/// ## Examples
///
/// ```
/// use fabrico_core::Pincode;
///
/// assert!(Pincode::parse("110001").is_ok());
/// assert!(Pincode::parse("560037").is_ok());
///
/// assert!(Pincode::parse("1100").is_err());    // too short
/// assert!(Pincode::parse("011001").is_err());  // leading zero
/// assert!(Pincode::parse("11000a").is_err());  // non-digit
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Pincode(String);

impl Pincode {
    /// Number of digits in a valid pincode.
    pub const LENGTH: usize = 6;

    /// Parse a `Pincode` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not exactly six ASCII digits or
    /// starts with a zero.
    pub fn parse(s: &str) -> Result<Self, PincodeError> {
        let s = s.trim();

        if s.chars().any(|c| !c.is_ascii_digit()) {
            return Err(PincodeError::NonDigit);
        }

        if s.len() != Self::LENGTH {
            return Err(PincodeError::WrongLength);
        }

        if s.starts_with('0') {
            return Err(PincodeError::LeadingZero);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the pincode as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Pincode` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Pincode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Pincode {
    type Err = PincodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Pincode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with sqlite feature)
#[cfg(feature = "sqlite")]
impl sqlx::Type<sqlx::Sqlite> for Pincode {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <String as sqlx::Type<sqlx::Sqlite>>::type_info()
    }

    fn compatible(ty: &sqlx::sqlite::SqliteTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Sqlite>>::compatible(ty)
    }
}

#[cfg(feature = "sqlite")]
impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for Pincode {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(s))
    }
}

#[cfg(feature = "sqlite")]
impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for Pincode {
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
        assert!(Pincode::parse("110001").is_ok());
        assert!(Pincode::parse("560037").is_ok());
        assert!(Pincode::parse("831001").is_ok());
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let pin = Pincode::parse(" 110001 ").unwrap();
        assert_eq!(pin.as_str(), "110001");
    }

    #[test]
    fn test_parse_wrong_length() {
        assert!(matches!(
            Pincode::parse("1100"),
            Err(PincodeError::WrongLength)
        ));
        assert!(matches!(
            Pincode::parse("1100011"),
            Err(PincodeError::WrongLength)
        ));
    }

    #[test]
    fn test_parse_non_digit() {
        assert!(matches!(
            Pincode::parse("11000a"),
            Err(PincodeError::NonDigit)
        ));
    }

    #[test]
    fn test_parse_leading_zero() {
        assert!(matches!(
            Pincode::parse("011001"),
            Err(PincodeError::LeadingZero)
        ));
    }

    #[test]
    fn test_serde_is_transparent() {
        let pin = Pincode::parse("110001").unwrap();
        assert_eq!(serde_json::to_string(&pin).unwrap(), "\"110001\"");
    }
}
