//! User domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use fabrico_core::{Email, Phone, UserId};

/// A storefront user (domain type).
///
/// Carries the password hash; never serialize this directly. Convert to
/// [`UserProfile`] for anything client-facing.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// User's email address (unique, lowercase).
    pub email: Email,
    /// Optional contact phone.
    pub phone: Option<Phone>,
    /// Argon2id password hash.
    pub password_hash: String,
    /// Whether the email was verified through the registration code.
    pub is_verified: bool,
    /// Whether the user currently counts as logged in.
    pub is_logged_in: bool,
    /// Cart additions the user has not looked at yet.
    pub unseen_cart_count: i64,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}

/// The client-facing view of a user. No credential material.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<Phone>,
    pub is_verified: bool,
    pub is_logged_in: bool,
    pub unseen_cart_count: i64,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            is_verified: user.is_verified,
            is_logged_in: user.is_logged_in,
            unseen_cart_count: user.unseen_cart_count,
            created_at: user.created_at,
        }
    }
}
