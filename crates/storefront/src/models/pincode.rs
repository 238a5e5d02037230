//! Serviceable-pincode registry types.

use serde::Serialize;

use fabrico_core::Pincode;

/// A registry row: one pincode we know about and whether we deliver there.
#[derive(Debug, Clone)]
pub struct PincodeEntry {
    pub pincode: Pincode,
    pub city: String,
    pub taluka: String,
    pub district: String,
    pub state: String,
    pub delivery_available: bool,
}

/// Response for a serviceability check.
///
/// Unknown pincodes and known-but-unserviced pincodes both answer
/// `{"valid": false}`; the locality fields appear only on success.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PincodeCheck {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taluka: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl PincodeCheck {
    /// A serviceable pincode with its locality details.
    #[must_use]
    pub fn serviceable(entry: &PincodeEntry) -> Self {
        Self {
            valid: true,
            city: Some(entry.city.clone()),
            taluka: Some(entry.taluka.clone()),
            district: Some(entry.district.clone()),
            state: Some(entry.state.clone()),
        }
    }

    /// An unknown or unserviced pincode.
    #[must_use]
    pub const fn not_serviceable() -> Self {
        Self {
            valid: false,
            city: None,
            taluka: None,
            district: None,
            state: None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_serviceable_carries_locality() {
        let entry = PincodeEntry {
            pincode: Pincode::parse("416416").unwrap(),
            city: "Sangli".to_string(),
            taluka: "Miraj".to_string(),
            district: "Sangli".to_string(),
            state: "Maharashtra".to_string(),
            delivery_available: true,
        };

        let json = serde_json::to_value(PincodeCheck::serviceable(&entry)).unwrap();
        assert_eq!(json["valid"], serde_json::json!(true));
        assert_eq!(json["city"], serde_json::json!("Sangli"));
    }

    #[test]
    fn test_not_serviceable_is_bare() {
        let json = serde_json::to_value(PincodeCheck::not_serviceable()).unwrap();
        assert_eq!(json, serde_json::json!({"valid": false}));
    }
}
