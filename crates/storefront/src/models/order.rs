//! Checkout receipt types.
//!
//! Orders are not persisted; a completed checkout returns an ephemeral
//! receipt and the fulfilment side picks it up downstream.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use fabrico_core::{OrderRef, PaymentMethod};

use super::address::Address;
use super::cart::CartLineView;

/// Receipt for a completed checkout.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReceipt {
    /// Opaque reference the client can quote in support requests.
    pub order_ref: OrderRef,
    /// The lines as they were at the moment of purchase.
    pub items: Vec<CartLineView>,
    #[serde(with = "rust_decimal::serde::str")]
    pub subtotal: Decimal,
    pub payment_method: PaymentMethod,
    /// Shipping address snapshot.
    pub address: Address,
    pub placed_at: DateTime<Utc>,
}
