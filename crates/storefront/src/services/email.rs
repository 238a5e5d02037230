//! Email delivery for verification codes.
//!
//! Uses SMTP via lettre for delivery with Askama HTML templates. When no SMTP
//! relay is configured the storefront falls back to an in-memory outbox so
//! registration still works in development.

use std::sync::{Arc, Mutex, PoisonError};

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::config::SmtpConfig;

/// HTML template for the registration verification code.
#[derive(Template)]
#[template(path = "email/registration_otp.html")]
struct RegistrationOtpHtml<'a> {
    code: &'a str,
}

/// Plain text template for the registration verification code.
#[derive(Template)]
#[template(path = "email/registration_otp.txt")]
struct RegistrationOtpText<'a> {
    code: &'a str,
}

/// HTML template for the password reset code.
#[derive(Template)]
#[template(path = "email/password_reset_otp.html")]
struct PasswordResetOtpHtml<'a> {
    code: &'a str,
}

/// Plain text template for the password reset code.
#[derive(Template)]
#[template(path = "email/password_reset_otp.txt")]
struct PasswordResetOtpText<'a> {
    code: &'a str,
}

const REGISTRATION_SUBJECT: &str = "Your Fabrico verification code";
const PASSWORD_RESET_SUBJECT: &str = "Reset your Fabrico password";

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// SMTP-backed mailer for transactional emails.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpMailer {
    /// Create a new mailer from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay settings are invalid.
    pub fn new(config: &SmtpConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.username.clone(),
            config.password.expose_secret().to_string(),
        );

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .port(config.port)
            .credentials(credentials)
            .build();

        Ok(Self {
            transport,
            from_address: config.from_address.clone(),
        })
    }

    /// Send a multipart email with both plain text and HTML versions.
    async fn send_multipart_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )?;

        self.transport.send(email).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent successfully");
        Ok(())
    }
}

/// A captured email in the in-memory outbox.
#[derive(Debug, Clone)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    /// Rendered plain text body.
    pub body: String,
}

/// In-memory mailer. Captures emails instead of delivering them.
#[derive(Debug, Clone, Default)]
pub struct MemoryMailer {
    outbox: Arc<Mutex<Vec<SentEmail>>>,
}

impl MemoryMailer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured emails, oldest first.
    #[must_use]
    pub fn sent(&self) -> Vec<SentEmail> {
        self.outbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn push(&self, email: SentEmail) {
        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            "SMTP not configured, captured email in memory outbox"
        );
        self.outbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(email);
    }
}

/// Email delivery backend.
///
/// The storefront always talks to a `Mailer`; which backend it gets is decided
/// once at startup from the SMTP configuration.
#[derive(Clone)]
pub enum Mailer {
    Smtp(SmtpMailer),
    Memory(MemoryMailer),
}

impl Mailer {
    /// Send the registration verification code.
    ///
    /// # Errors
    ///
    /// Returns error if the email fails to render or send.
    pub async fn send_registration_otp(&self, to: &str, code: &str) -> Result<(), EmailError> {
        let text = RegistrationOtpText { code }.render()?;

        match self {
            Self::Smtp(mailer) => {
                let html = RegistrationOtpHtml { code }.render()?;
                mailer
                    .send_multipart_email(to, REGISTRATION_SUBJECT, &text, &html)
                    .await
            }
            Self::Memory(outbox) => {
                outbox.push(SentEmail {
                    to: to.to_string(),
                    subject: REGISTRATION_SUBJECT.to_string(),
                    body: text,
                });
                Ok(())
            }
        }
    }

    /// Send the password reset code.
    ///
    /// # Errors
    ///
    /// Returns error if the email fails to render or send.
    pub async fn send_password_reset_otp(&self, to: &str, code: &str) -> Result<(), EmailError> {
        let text = PasswordResetOtpText { code }.render()?;

        match self {
            Self::Smtp(mailer) => {
                let html = PasswordResetOtpHtml { code }.render()?;
                mailer
                    .send_multipart_email(to, PASSWORD_RESET_SUBJECT, &text, &html)
                    .await
            }
            Self::Memory(outbox) => {
                outbox.push(SentEmail {
                    to: to.to_string(),
                    subject: PASSWORD_RESET_SUBJECT.to_string(),
                    body: text,
                });
                Ok(())
            }
        }
    }
}

/// Generate a 6-digit verification code.
#[must_use]
pub fn generate_verification_code() -> String {
    use rand::Rng;
    let code: u32 = rand::rng().random_range(100_000..1_000_000);
    code.to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_verification_code_format() {
        let code = generate_verification_code();
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_generate_verification_code_range() {
        for _ in 0..100 {
            let code: u32 = generate_verification_code().parse().expect("valid number");
            assert!(code >= 100_000);
            assert!(code < 1_000_000);
        }
    }

    #[tokio::test]
    async fn test_memory_mailer_captures_code() {
        let outbox = MemoryMailer::new();
        let mailer = Mailer::Memory(outbox.clone());

        mailer
            .send_registration_otp("asha@example.com", "123456")
            .await
            .unwrap();

        let sent = outbox.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "asha@example.com");
        assert_eq!(sent[0].subject, REGISTRATION_SUBJECT);
        assert!(sent[0].body.contains("123456"));
    }

    #[tokio::test]
    async fn test_memory_mailer_keeps_order() {
        let outbox = MemoryMailer::new();
        let mailer = Mailer::Memory(outbox.clone());

        mailer
            .send_registration_otp("a@example.com", "111111")
            .await
            .unwrap();
        mailer
            .send_password_reset_otp("a@example.com", "222222")
            .await
            .unwrap();

        let sent = outbox.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].subject, REGISTRATION_SUBJECT);
        assert_eq!(sent[1].subject, PASSWORD_RESET_SUBJECT);
        assert!(sent[1].body.contains("222222"));
    }
}
