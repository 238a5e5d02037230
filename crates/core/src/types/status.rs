//! Domain enums shared across the storefront.

use serde::{Deserialize, Serialize};

/// Top-level catalog category.
///
/// Serialized with the display names the catalog uses (`"Men"`, `"Women"`,
/// `"Kids"`); stored in the database as snake_case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlite", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlite", sqlx(rename_all = "snake_case"))]
pub enum Category {
    Men,
    Women,
    Kids,
}

impl Category {
    /// Subcategories a product in this category may carry.
    #[must_use]
    pub const fn subcategories(self) -> &'static [&'static str] {
        match self {
            Self::Men => &[
                "T-Shirts",
                "Shirts",
                "Jeans",
                "Trousers",
                "Jackets",
                "Sweatshirts",
            ],
            Self::Women => &["Tops", "Dresses", "Kurtis", "Jeans", "Sarees", "Jackets"],
            Self::Kids => &["T-Shirts", "Shirts", "Jeans", "Shorts", "Sweatshirts"],
        }
    }

    /// Whether `sub_category` is valid for this category.
    #[must_use]
    pub fn allows_subcategory(self, sub_category: &str) -> bool {
        self.subcategories()
            .iter()
            .any(|s| s.eq_ignore_ascii_case(sub_category))
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Men => write!(f, "Men"),
            Self::Women => write!(f, "Women"),
            Self::Kids => write!(f, "Kids"),
        }
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Men" | "men" => Ok(Self::Men),
            "Women" | "women" => Ok(Self::Women),
            "Kids" | "kids" => Ok(Self::Kids),
            _ => Err(format!("invalid category: {s}")),
        }
    }
}

/// Label for a saved shipping address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "sqlite", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlite", sqlx(rename_all = "snake_case"))]
pub enum AddressType {
    #[default]
    Home,
    Work,
}

impl std::fmt::Display for AddressType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Home => write!(f, "Home"),
            Self::Work => write!(f, "Work"),
        }
    }
}

/// What an issued one-time password proves.
///
/// A verification code is only valid for the purpose it was issued under;
/// a registration code cannot reset a password.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtpPurpose {
    Registration,
    PasswordReset,
}

impl std::fmt::Display for OtpPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Registration => write!(f, "registration"),
            Self::PasswordReset => write!(f, "password_reset"),
        }
    }
}

/// How a checkout is paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash on delivery. Only accepted when every cart line allows it.
    Cod,
    /// Card payment through the gateway.
    Card,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cod => write!(f, "cod"),
            Self::Card => write!(f, "card"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_category_wire_format() {
        assert_eq!(serde_json::to_string(&Category::Men).unwrap(), "\"Men\"");
        let parsed: Category = serde_json::from_str("\"Kids\"").unwrap();
        assert_eq!(parsed, Category::Kids);
    }

    #[test]
    fn test_category_subcategory_table() {
        assert!(Category::Men.allows_subcategory("T-Shirts"));
        assert!(Category::Men.allows_subcategory("t-shirts"));
        assert!(!Category::Men.allows_subcategory("Sarees"));
        assert!(Category::Women.allows_subcategory("Sarees"));
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("Men".parse::<Category>().unwrap(), Category::Men);
        assert_eq!("women".parse::<Category>().unwrap(), Category::Women);
        assert!("Pets".parse::<Category>().is_err());
    }

    #[test]
    fn test_payment_method_wire_format() {
        assert_eq!(serde_json::to_string(&PaymentMethod::Cod).unwrap(), "\"cod\"");
        let parsed: PaymentMethod = serde_json::from_str("\"card\"").unwrap();
        assert_eq!(parsed, PaymentMethod::Card);
    }

    #[test]
    fn test_otp_purpose_display() {
        assert_eq!(OtpPurpose::Registration.to_string(), "registration");
        assert_eq!(OtpPurpose::PasswordReset.to_string(), "password_reset");
    }

    #[test]
    fn test_address_type_default() {
        assert_eq!(AddressType::default(), AddressType::Home);
    }
}
