//! Saved shipping addresses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fabrico_core::{AddressId, AddressType, Phone, Pincode, UserId};

/// A user's saved shipping address.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: AddressId,
    #[serde(skip)]
    pub user_id: UserId,
    /// Recipient name.
    pub name: String,
    pub mobile_number: Phone,
    pub pincode: Pincode,
    pub address_line1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,
    pub city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taluka: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub landmark: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternate_phone: Option<Phone>,
    pub address_type: AddressType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

/// Address payload as submitted by clients. Raw strings; the address service
/// parses and validates before anything is stored.
///
/// `is_default` is intentionally absent: the first saved address becomes the
/// default and later changes go through the set-default endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAddress {
    pub name: String,
    pub mobile_number: String,
    pub pincode: String,
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: Option<String>,
    /// City; filled from the pincode registry when omitted.
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub taluka: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
    /// State; filled from the pincode registry when omitted.
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub landmark: Option<String>,
    #[serde(default)]
    pub alternate_phone: Option<String>,
    #[serde(default)]
    pub address_type: AddressType,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// A validated address ready to store, produced by the address service.
#[derive(Debug, Clone)]
pub struct ValidatedAddress {
    pub name: String,
    pub mobile_number: Phone,
    pub pincode: Pincode,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub taluka: Option<String>,
    pub district: Option<String>,
    pub state: String,
    pub landmark: Option<String>,
    pub alternate_phone: Option<Phone>,
    pub address_type: AddressType,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}
