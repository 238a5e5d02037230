//! CSS color token type for product variants.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`ColorToken`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum ColorTokenError {
    /// The input string is empty.
    #[error("color cannot be empty")]
    Empty,
    /// A `#` hex form with the wrong number of digits or non-hex characters.
    #[error("hex color must be #rgb or #rrggbb")]
    InvalidHex,
    /// The name is not a CSS named color.
    #[error("unknown color name: {0}")]
    UnknownName(String),
}

/// CSS named colors (extended keyword set), sorted for binary search.
const NAMED_COLORS: &[&str] = &[
    "aliceblue",
    "antiquewhite",
    "aqua",
    "aquamarine",
    "azure",
    "beige",
    "bisque",
    "black",
    "blanchedalmond",
    "blue",
    "blueviolet",
    "brown",
    "burlywood",
    "cadetblue",
    "chartreuse",
    "chocolate",
    "coral",
    "cornflowerblue",
    "cornsilk",
    "crimson",
    "cyan",
    "darkblue",
    "darkcyan",
    "darkgoldenrod",
    "darkgray",
    "darkgreen",
    "darkgrey",
    "darkkhaki",
    "darkmagenta",
    "darkolivegreen",
    "darkorange",
    "darkorchid",
    "darkred",
    "darksalmon",
    "darkseagreen",
    "darkslateblue",
    "darkslategray",
    "darkslategrey",
    "darkturquoise",
    "darkviolet",
    "deeppink",
    "deepskyblue",
    "dimgray",
    "dimgrey",
    "dodgerblue",
    "firebrick",
    "floralwhite",
    "forestgreen",
    "fuchsia",
    "gainsboro",
    "ghostwhite",
    "gold",
    "goldenrod",
    "gray",
    "green",
    "greenyellow",
    "grey",
    "honeydew",
    "hotpink",
    "indianred",
    "indigo",
    "ivory",
    "khaki",
    "lavender",
    "lavenderblush",
    "lawngreen",
    "lemonchiffon",
    "lightblue",
    "lightcoral",
    "lightcyan",
    "lightgoldenrodyellow",
    "lightgray",
    "lightgreen",
    "lightgrey",
    "lightpink",
    "lightsalmon",
    "lightseagreen",
    "lightskyblue",
    "lightslategray",
    "lightslategrey",
    "lightsteelblue",
    "lightyellow",
    "lime",
    "limegreen",
    "linen",
    "magenta",
    "maroon",
    "mediumaquamarine",
    "mediumblue",
    "mediumorchid",
    "mediumpurple",
    "mediumseagreen",
    "mediumslateblue",
    "mediumspringgreen",
    "mediumturquoise",
    "mediumvioletred",
    "midnightblue",
    "mintcream",
    "mistyrose",
    "moccasin",
    "navajowhite",
    "navy",
    "oldlace",
    "olive",
    "olivedrab",
    "orange",
    "orangered",
    "orchid",
    "palegoldenrod",
    "palegreen",
    "paleturquoise",
    "palevioletred",
    "papayawhip",
    "peachpuff",
    "peru",
    "pink",
    "plum",
    "powderblue",
    "purple",
    "rebeccapurple",
    "red",
    "rosybrown",
    "royalblue",
    "saddlebrown",
    "salmon",
    "sandybrown",
    "seagreen",
    "seashell",
    "sienna",
    "silver",
    "skyblue",
    "slateblue",
    "slategray",
    "slategrey",
    "snow",
    "springgreen",
    "steelblue",
    "tan",
    "teal",
    "thistle",
    "tomato",
    "turquoise",
    "violet",
    "wheat",
    "white",
    "whitesmoke",
    "yellow",
    "yellowgreen",
];

/// A variant color, restricted to tokens the storefront can render directly:
/// a CSS named color or a `#rgb`/`#rrggbb` hex value.
///
/// Parsing lowercases the input (CSS color keywords are case-insensitive).
///
/// ## Examples
///
/// ```
/// use fabrico_core::ColorToken;
///
/// assert!(ColorToken::parse("navy").is_ok());
/// assert!(ColorToken::parse("Crimson").is_ok());
/// assert!(ColorToken::parse("#1a2b3c").is_ok());
/// assert!(ColorToken::parse("#fff").is_ok());
///
/// assert!(ColorToken::parse("blurple").is_err());
/// assert!(ColorToken::parse("#12345").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ColorToken(String);

impl ColorToken {
    /// Parse a `ColorToken` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, a malformed hex value, or a
    /// name outside the CSS named-color set.
    pub fn parse(s: &str) -> Result<Self, ColorTokenError> {
        let s = s.trim().to_lowercase();

        if s.is_empty() {
            return Err(ColorTokenError::Empty);
        }

        if let Some(hex) = s.strip_prefix('#') {
            let valid_len = hex.len() == 3 || hex.len() == 6;
            if !valid_len || hex.chars().any(|c| !c.is_ascii_hexdigit()) {
                return Err(ColorTokenError::InvalidHex);
            }
            return Ok(Self(s));
        }

        if NAMED_COLORS.binary_search(&s.as_str()).is_err() {
            return Err(ColorTokenError::UnknownName(s));
        }

        Ok(Self(s))
    }

    /// Returns the color token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `ColorToken` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ColorToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ColorToken {
    type Err = ColorTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for ColorToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with sqlite feature)
#[cfg(feature = "sqlite")]
impl sqlx::Type<sqlx::Sqlite> for ColorToken {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <String as sqlx::Type<sqlx::Sqlite>>::type_info()
    }

    fn compatible(ty: &sqlx::sqlite::SqliteTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Sqlite>>::compatible(ty)
    }
}

#[cfg(feature = "sqlite")]
impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for ColorToken {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(s))
    }
}

#[cfg(feature = "sqlite")]
impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for ColorToken {
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
    fn test_named_colors_are_sorted() {
        let mut sorted = NAMED_COLORS.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, NAMED_COLORS);
    }

    #[test]
    fn test_parse_named() {
        assert!(ColorToken::parse("red").is_ok());
        assert!(ColorToken::parse("navy").is_ok());
        assert!(ColorToken::parse("rebeccapurple").is_ok());
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        let color = ColorToken::parse("CriMSon").unwrap();
        assert_eq!(color.as_str(), "crimson");
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(ColorToken::parse("#fff").unwrap().as_str(), "#fff");
        assert_eq!(ColorToken::parse("#1A2B3C").unwrap().as_str(), "#1a2b3c");
    }

    #[test]
    fn test_parse_bad_hex() {
        assert!(matches!(
            ColorToken::parse("#12345"),
            Err(ColorTokenError::InvalidHex)
        ));
        assert!(matches!(
            ColorToken::parse("#ggg"),
            Err(ColorTokenError::InvalidHex)
        ));
        assert!(matches!(
            ColorToken::parse("#"),
            Err(ColorTokenError::InvalidHex)
        ));
    }

    #[test]
    fn test_parse_unknown_name() {
        assert!(matches!(
            ColorToken::parse("blurple"),
            Err(ColorTokenError::UnknownName(_))
        ));
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(ColorToken::parse(""), Err(ColorTokenError::Empty)));
        assert!(matches!(
            ColorToken::parse("  "),
            Err(ColorTokenError::Empty)
        ));
    }
}
