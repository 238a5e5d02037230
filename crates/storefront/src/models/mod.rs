//! Domain models for the storefront.

pub mod address;
pub mod cart;
pub mod catalog;
pub mod order;
pub mod pincode;
pub mod user;
