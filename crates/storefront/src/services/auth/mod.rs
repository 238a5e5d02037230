//! Authentication service.
//!
//! Registration and password reset are gated on emailed one-time codes; login
//! is email + password. Passwords are stored as Argon2id hashes.

mod error;
mod otp;

pub use error::AuthError;
pub use otp::{OTP_TTL, OtpError, OtpStore};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::SqlitePool;

use fabrico_core::{Email, OtpPurpose, Phone, UserId};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::user::User;
use crate::services::email::{Mailer, generate_verification_code};

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Authentication service.
///
/// Handles OTP-gated registration, login state, and password resets.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    otp: &'a OtpStore,
    mailer: &'a Mailer,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool, otp: &'a OtpStore, mailer: &'a Mailer) -> Self {
        Self {
            users: UserRepository::new(pool),
            otp,
            mailer,
        }
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Issue and email a registration code.
    ///
    /// Refuses up front when the email is already registered so the client can
    /// route the user to login instead of burning a code.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    /// Returns `AuthError::MailDispatch` if the email cannot be sent.
    pub async fn send_registration_otp(&self, email: &str) -> Result<(), AuthError> {
        let email = Email::parse(email)?;

        if self.users.email_exists(&email).await? {
            return Err(AuthError::UserAlreadyExists);
        }

        let code = generate_verification_code();
        self.otp
            .issue(email.as_str(), OtpPurpose::Registration, &code)
            .await;
        self.mailer
            .send_registration_otp(email.as_str(), &code)
            .await?;

        Ok(())
    }

    /// Complete registration: verify the emailed code and create the account.
    ///
    /// Input is validated before the code is consumed, so a rejected password
    /// does not burn the code.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` / `AuthError::InvalidPhone` on malformed input.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::InvalidOtp` / `AuthError::OtpExpired` if the code is wrong or stale.
    /// Returns `AuthError::UserAlreadyExists` if the email got registered meanwhile.
    pub async fn verify_registration(
        &self,
        email: &str,
        code: &str,
        name: &str,
        phone: Option<&str>,
        password: &str,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        let phone = phone
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(Phone::parse)
            .transpose()?;
        validate_password(password)?;

        self.otp
            .verify(email.as_str(), OtpPurpose::Registration, code)
            .await?;

        let password_hash = hash_password(password)?;
        let user = self
            .users
            .create_verified(name.trim(), &email, phone.as_ref(), &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        Ok(user)
    }

    // =========================================================================
    // Login / Logout
    // =========================================================================

    /// Login with email and password.
    ///
    /// On success the user is marked logged in and the unseen-cart counter is
    /// recomputed from the stored cart.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        // A malformed email can never match an account; report it the same way
        // as a wrong password
        let Ok(email) = Email::parse(email) else {
            return Err(AuthError::InvalidCredentials);
        };

        let user = self
            .users
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &user.password_hash)?;

        let user = self.users.mark_logged_in(user.id).await?;
        Ok(user)
    }

    /// Mark a user logged out. The unseen-cart counter is left as is and
    /// recomputed on the next login.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    pub async fn logout(&self, user_id: UserId) -> Result<User, AuthError> {
        self.users
            .mark_logged_out(user_id)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AuthError::UserNotFound,
                other => AuthError::Repository(other),
            })
    }

    /// Force the login flag to a given state.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    pub async fn set_login_status(
        &self,
        user_id: UserId,
        logged_in: bool,
    ) -> Result<User, AuthError> {
        let result = if logged_in {
            self.users.mark_logged_in(user_id).await
        } else {
            self.users.mark_logged_out(user_id).await
        };

        result.map_err(|e| match e {
            RepositoryError::NotFound => AuthError::UserNotFound,
            other => AuthError::Repository(other),
        })
    }

    // =========================================================================
    // Password Reset
    // =========================================================================

    /// Issue and email a password reset code.
    ///
    /// Outwardly succeeds whether or not the account exists, so the endpoint
    /// cannot be used to probe for registered emails.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MailDispatch` if an email was due but could not be sent.
    pub async fn forgot_password(&self, email: &str) -> Result<(), AuthError> {
        let Ok(email) = Email::parse(email) else {
            return Ok(());
        };

        if !self.users.email_exists(&email).await? {
            return Ok(());
        }

        let code = generate_verification_code();
        self.otp
            .issue(email.as_str(), OtpPurpose::PasswordReset, &code)
            .await;
        self.mailer
            .send_password_reset_otp(email.as_str(), &code)
            .await?;

        Ok(())
    }

    /// Set a new password after verifying the emailed reset code.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` if the new password doesn't meet requirements.
    /// Returns `AuthError::InvalidOtp` / `AuthError::OtpExpired` if the code is wrong or stale.
    pub async fn reset_password(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let email = Email::parse(email)?;
        validate_password(new_password)?;

        self.otp
            .verify(email.as_str(), OtpPurpose::PasswordReset, code)
            .await?;

        let user = self
            .users
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let password_hash = hash_password(new_password)?;
        self.users
            .update_password(user.id, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AuthError::UserNotFound,
                other => AuthError::Repository(other),
            })?;

        Ok(())
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// Whether an account exists for this email.
    ///
    /// A malformed email can never match an account, so it reports `false`
    /// rather than an error.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the database operation fails.
    pub async fn check_email(&self, email: &str) -> Result<bool, AuthError> {
        let Ok(email) = Email::parse(email) else {
            return Ok(false);
        };
        Ok(self.users.email_exists(&email).await?)
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    // Add more validation as needed (uppercase, numbers, symbols, etc.)

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password_length() {
        assert!(matches!(
            validate_password("short"),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(matches!(
            validate_password("1234567"),
            Err(AuthError::WeakPassword(_))
        ));
        validate_password("12345678").unwrap();
    }

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(hash.starts_with("$argon2"));

        verify_password("correct horse battery", &hash).unwrap();
        assert!(matches!(
            verify_password("wrong password", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same password").unwrap();
        let b = hash_password("same password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_otp_error_mapping() {
        assert!(matches!(
            AuthError::from(OtpError::Mismatch),
            AuthError::InvalidOtp
        ));
        assert!(matches!(
            AuthError::from(OtpError::Expired),
            AuthError::OtpExpired
        ));
    }
}
