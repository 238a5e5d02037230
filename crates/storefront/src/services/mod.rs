//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `address` - Address book with pincode serviceability validation
//! - `auth` - OTP-gated registration, login, password reset
//! - `cart` - Cart operations and catalog-resolved snapshots
//! - `catalog` - Product listing and detail reads
//! - `checkout` - Order placement over the live cart
//! - `email` - Email delivery via SMTP (or an in-memory outbox in dev)
//! - `pincode` - Cached serviceability lookups against the registry

pub mod address;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod email;
pub mod pincode;

pub use address::{AddressError, AddressService};
pub use auth::{AuthError, AuthService, OTP_TTL, OtpError, OtpStore};
pub use cart::{CartError, CartService};
pub use catalog::CatalogService;
pub use checkout::{CheckoutError, CheckoutService};
pub use email::{
    EmailError, Mailer, MemoryMailer, SentEmail, SmtpMailer, generate_verification_code,
};
pub use pincode::{PincodeCache, PincodeService, pincode_cache};
