//! One-time password store.
//!
//! Codes live in memory with a TTL; they are never persisted. A code is bound
//! to an email and a purpose, so a registration code cannot reset a password.
//! Issuing a new code replaces any outstanding one for the same key.

use std::time::Duration;

use moka::future::Cache;
use thiserror::Error;

use fabrico_core::OtpPurpose;

/// How long an issued code stays valid.
pub const OTP_TTL: Duration = Duration::from_secs(5 * 60);

/// Outcome of a failed verification.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OtpError {
    /// No live code for this email and purpose.
    #[error("code expired or never issued")]
    Expired,

    /// A live code exists but the submitted one does not match.
    #[error("code does not match")]
    Mismatch,
}

/// In-memory store of outstanding verification codes.
///
/// Cloning is cheap; all clones share the same cache.
#[derive(Clone)]
pub struct OtpStore {
    codes: Cache<(String, OtpPurpose), String>,
}

impl OtpStore {
    /// Store with the standard 5-minute TTL.
    #[must_use]
    pub fn new() -> Self {
        Self::with_ttl(OTP_TTL)
    }

    /// Store with a custom TTL.
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            codes: Cache::builder()
                .max_capacity(10_000)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Issue a code for an email and purpose, replacing any outstanding one.
    pub async fn issue(&self, email: &str, purpose: OtpPurpose, code: &str) {
        self.codes
            .insert((email.to_string(), purpose), code.to_string())
            .await;
    }

    /// Verify and consume a code.
    ///
    /// A matching code is invalidated so it cannot be replayed. A mismatching
    /// code leaves the outstanding one in place, the user may simply have
    /// mistyped it.
    ///
    /// # Errors
    ///
    /// Returns [`OtpError::Expired`] if no live code exists, or
    /// [`OtpError::Mismatch`] if the submitted code is wrong.
    pub async fn verify(
        &self,
        email: &str,
        purpose: OtpPurpose,
        code: &str,
    ) -> Result<(), OtpError> {
        let key = (email.to_string(), purpose);
        let expected = self.codes.get(&key).await.ok_or(OtpError::Expired)?;

        if expected != code {
            return Err(OtpError::Mismatch);
        }

        self.codes.invalidate(&key).await;
        Ok(())
    }
}

impl Default for OtpStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_verify_consumes_code() {
        let store = OtpStore::new();
        store
            .issue("asha@example.com", OtpPurpose::Registration, "123456")
            .await;

        store
            .verify("asha@example.com", OtpPurpose::Registration, "123456")
            .await
            .unwrap();

        // A second attempt with the same code must fail
        let err = store
            .verify("asha@example.com", OtpPurpose::Registration, "123456")
            .await
            .unwrap_err();
        assert_eq!(err, OtpError::Expired);
    }

    #[tokio::test]
    async fn test_mismatch_keeps_code_alive() {
        let store = OtpStore::new();
        store
            .issue("asha@example.com", OtpPurpose::Registration, "123456")
            .await;

        let err = store
            .verify("asha@example.com", OtpPurpose::Registration, "654321")
            .await
            .unwrap_err();
        assert_eq!(err, OtpError::Mismatch);

        store
            .verify("asha@example.com", OtpPurpose::Registration, "123456")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_purposes_are_isolated() {
        let store = OtpStore::new();
        store
            .issue("asha@example.com", OtpPurpose::Registration, "123456")
            .await;

        let err = store
            .verify("asha@example.com", OtpPurpose::PasswordReset, "123456")
            .await
            .unwrap_err();
        assert_eq!(err, OtpError::Expired);
    }

    #[tokio::test]
    async fn test_reissue_replaces_code() {
        let store = OtpStore::new();
        store
            .issue("asha@example.com", OtpPurpose::Registration, "111111")
            .await;
        store
            .issue("asha@example.com", OtpPurpose::Registration, "222222")
            .await;

        let err = store
            .verify("asha@example.com", OtpPurpose::Registration, "111111")
            .await
            .unwrap_err();
        assert_eq!(err, OtpError::Mismatch);

        store
            .verify("asha@example.com", OtpPurpose::Registration, "222222")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_code_expires() {
        let store = OtpStore::with_ttl(Duration::from_millis(50));
        store
            .issue("asha@example.com", OtpPurpose::Registration, "123456")
            .await;

        tokio::time::sleep(Duration::from_millis(80)).await;

        let err = store
            .verify("asha@example.com", OtpPurpose::Registration, "123456")
            .await
            .unwrap_err();
        assert_eq!(err, OtpError::Expired);
    }
}
