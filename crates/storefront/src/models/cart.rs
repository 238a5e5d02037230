//! Cart domain types.
//!
//! A cart line stores only the chosen product/variant and a quantity; price,
//! stock and COD are resolved against the live catalog at read time so a
//! snapshot can never show stale catalog data.

use rust_decimal::Decimal;
use serde::Serialize;

use chrono::{DateTime, Utc};
use fabrico_core::{CartLineId, Category, ColorToken, ProductId, UserId, VariantId};

use super::catalog::{Product, Variant};

/// A cart line as stored. At most one per (user, product).
#[derive(Debug, Clone)]
pub struct CartLine {
    pub id: CartLineId,
    pub user_id: UserId,
    pub product_id: ProductId,
    /// The chosen color variant.
    pub variant_id: VariantId,
    /// Desired units; 1..=variant stock at the time of the last mutation.
    pub quantity: i64,
    pub added_at: DateTime<Utc>,
}

/// A cart line resolved against the live catalog.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
    pub product_id: ProductId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    pub category: Category,
    pub sub_category: String,
    pub variant_id: VariantId,
    /// The variant's current display position.
    pub variant_index: i64,
    pub color: ColorToken,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Live stock for the chosen variant.
    pub stock: i64,
    /// Effective COD flag (variant override or product default).
    pub cod_available: bool,
    pub quantity: i64,
    #[serde(with = "rust_decimal::serde::str")]
    pub line_total: Decimal,
}

impl CartLineView {
    /// Resolve a stored line against its product and variant.
    #[must_use]
    pub fn resolve(line: &CartLine, product: &Product, variant: &Variant) -> Self {
        let quantity = line.quantity;
        Self {
            product_id: product.id,
            name: product.name.clone(),
            price: product.price,
            category: product.category,
            sub_category: product.sub_category.clone(),
            variant_id: variant.id,
            variant_index: variant.position,
            color: variant.color.clone(),
            image: variant.primary_image().map(str::to_string),
            stock: variant.quantity,
            cod_available: variant.effective_cod(product.cod_available),
            quantity,
            line_total: product.price * Decimal::from(quantity),
        }
    }
}

/// The full cart payload returned by every cart operation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    pub items: Vec<CartLineView>,
    #[serde(with = "rust_decimal::serde::str")]
    pub subtotal: Decimal,
    /// Additions the user has not looked at yet.
    pub unseen_count: i64,
}

impl CartSnapshot {
    /// Assemble a snapshot from resolved lines.
    #[must_use]
    pub fn new(items: Vec<CartLineView>, unseen_count: i64) -> Self {
        let subtotal = items.iter().map(|line| line.line_total).sum();
        Self {
            items,
            subtotal,
            unseen_count,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use fabrico_core::Category;

    fn line_view(total: &str) -> CartLineView {
        CartLineView {
            product_id: ProductId::new(1),
            name: "Linen Kurti".to_string(),
            price: total.parse().unwrap(),
            category: Category::Women,
            sub_category: "Kurtis".to_string(),
            variant_id: VariantId::new(10),
            variant_index: 0,
            color: ColorToken::parse("teal").unwrap(),
            image: None,
            stock: 4,
            cod_available: true,
            quantity: 1,
            line_total: total.parse().unwrap(),
        }
    }

    #[test]
    fn test_snapshot_sums_line_totals() {
        let snapshot = CartSnapshot::new(vec![line_view("199.50"), line_view("300.50")], 2);
        assert_eq!(snapshot.subtotal, "500.00".parse().unwrap());
        assert_eq!(snapshot.unseen_count, 2);
    }

    #[test]
    fn test_empty_snapshot_is_zero() {
        let snapshot = CartSnapshot::new(vec![], 0);
        assert_eq!(snapshot.subtotal, Decimal::ZERO);
        assert!(snapshot.items.is_empty());
    }

    #[test]
    fn test_snapshot_wire_shape() {
        let json = serde_json::to_value(CartSnapshot::new(vec![line_view("10.00")], 1)).unwrap();
        assert_eq!(json["subtotal"], serde_json::json!("10.00"));
        assert_eq!(json["unseenCount"], serde_json::json!(1));
        assert_eq!(json["items"][0]["variantIndex"], serde_json::json!(0));
        assert_eq!(json["items"][0]["codAvailable"], serde_json::json!(true));
    }
}
