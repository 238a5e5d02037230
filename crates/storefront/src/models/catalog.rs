//! Catalog domain types: products and their color variants.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use fabrico_core::{Category, ColorToken, ProductId, VariantId};

/// A sellable product with its ordered color variants.
#[derive(Debug, Clone)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Optional long description.
    pub description: Option<String>,
    /// Unit price. Currency-agnostic; formatting is a client concern.
    pub price: Decimal,
    /// Top-level category (Men/Women/Kids).
    pub category: Category,
    /// Subcategory, validated against the category's table on seed.
    pub sub_category: String,
    /// Product-level cash-on-delivery default.
    pub cod_available: bool,
    /// Available sizes, in display order.
    pub sizes: Vec<String>,
    /// Color variants in display order (`position` ascending).
    pub variants: Vec<Variant>,
    /// When the product was added to the catalog.
    pub created_at: DateTime<Utc>,
}

/// A color variant of a product.
#[derive(Debug, Clone)]
pub struct Variant {
    /// Stable variant ID; survives reordering.
    pub id: VariantId,
    /// Zero-based display position. This is the `variantIndex` clients send.
    pub position: i64,
    /// Validated CSS color token.
    pub color: ColorToken,
    /// Units in stock. Authoritative; checked on every cart mutation.
    pub quantity: i64,
    /// Image URIs; the first is the primary preview.
    pub images: Vec<String>,
    /// Per-variant COD override. `None` falls back to the product default.
    pub cod_available: Option<bool>,
}

impl Variant {
    /// The COD flag a client actually sees for this variant.
    #[must_use]
    pub fn effective_cod(&self, product_default: bool) -> bool {
        self.cod_available.unwrap_or(product_default)
    }

    /// First image, if any.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

impl Product {
    /// Variant at the given display position.
    #[must_use]
    pub fn variant_at(&self, position: i64) -> Option<&Variant> {
        self.variants.iter().find(|v| v.position == position)
    }

    /// Total units in stock across all variants.
    #[must_use]
    pub fn total_stock(&self) -> i64 {
        self.variants.iter().map(|v| v.quantity).sum()
    }

    /// Primary preview image: first image of the first variant.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.variants.first().and_then(Variant::primary_image)
    }
}

/// A new product to insert, used by the seeding CLI.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub category: Category,
    pub sub_category: String,
    pub cod_available: bool,
    pub sizes: Vec<String>,
    pub variants: Vec<NewVariant>,
}

/// A new variant to insert alongside its product.
#[derive(Debug, Clone)]
pub struct NewVariant {
    pub color: ColorToken,
    pub quantity: i64,
    pub images: Vec<String>,
    pub cod_available: Option<bool>,
}

/// Listing view of a product: the fields the grid needs, nothing more.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    pub category: Category,
    pub sub_category: String,
    /// First image of the first variant, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Total stock across variants.
    pub stock: i64,
}

impl From<&Product> for ProductSummary {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
            category: product.category,
            sub_category: product.sub_category.clone(),
            image: product.primary_image().map(str::to_string),
            stock: product.total_stock(),
        }
    }
}

/// Detail view of a product with COD resolved per variant.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    pub id: ProductId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    pub category: Category,
    pub sub_category: String,
    pub cod_available: bool,
    pub sizes: Vec<String>,
    pub variants: Vec<VariantView>,
    pub created_at: DateTime<Utc>,
}

/// A variant as rendered to clients. `cod_available` is the effective value.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantView {
    pub id: VariantId,
    pub position: i64,
    pub color: ColorToken,
    pub quantity: i64,
    pub images: Vec<String>,
    pub cod_available: bool,
}

impl From<Product> for ProductDetail {
    fn from(product: Product) -> Self {
        let product_cod = product.cod_available;
        let variants = product
            .variants
            .iter()
            .map(|v| VariantView {
                id: v.id,
                position: v.position,
                color: v.color.clone(),
                quantity: v.quantity,
                images: v.images.clone(),
                cod_available: v.effective_cod(product_cod),
            })
            .collect();

        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price,
            category: product.category,
            sub_category: product.sub_category,
            cod_available: product.cod_available,
            sizes: product.sizes,
            variants,
            created_at: product.created_at,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn variant(position: i64, quantity: i64, cod: Option<bool>) -> Variant {
        Variant {
            id: VariantId::new(position + 100),
            position,
            color: ColorToken::parse("navy").unwrap(),
            quantity,
            images: vec![format!("https://cdn.fabrico.shop/v{position}.jpg")],
            cod_available: cod,
        }
    }

    fn product(cod: bool, variants: Vec<Variant>) -> Product {
        Product {
            id: ProductId::new(1),
            name: "Oxford Shirt".to_string(),
            description: None,
            price: Decimal::new(49900, 2),
            category: Category::Men,
            sub_category: "Shirts".to_string(),
            cod_available: cod,
            sizes: vec!["S".to_string(), "M".to_string()],
            variants,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_effective_cod_falls_back_to_product() {
        let v = variant(0, 5, None);
        assert!(v.effective_cod(true));
        assert!(!v.effective_cod(false));
    }

    #[test]
    fn test_effective_cod_override_wins() {
        let v = variant(0, 5, Some(false));
        assert!(!v.effective_cod(true));

        let v = variant(0, 5, Some(true));
        assert!(v.effective_cod(false));
    }

    #[test]
    fn test_total_stock_sums_variants() {
        let p = product(true, vec![variant(0, 3, None), variant(1, 4, None)]);
        assert_eq!(p.total_stock(), 7);
    }

    #[test]
    fn test_summary_uses_first_variant_image() {
        let p = product(true, vec![variant(0, 3, None), variant(1, 4, None)]);
        let summary = ProductSummary::from(&p);
        assert_eq!(summary.image.as_deref(), Some("https://cdn.fabrico.shop/v0.jpg"));
        assert_eq!(summary.stock, 7);
    }

    #[test]
    fn test_summary_without_variants_has_no_image() {
        let p = product(true, vec![]);
        let summary = ProductSummary::from(&p);
        assert_eq!(summary.image, None);
        assert_eq!(summary.stock, 0);
    }

    #[test]
    fn test_detail_resolves_cod_per_variant() {
        let p = product(true, vec![variant(0, 3, Some(false)), variant(1, 4, None)]);
        let detail = ProductDetail::from(p);
        assert!(!detail.variants[0].cod_available);
        assert!(detail.variants[1].cod_available);
    }

    #[test]
    fn test_price_serializes_as_string() {
        let p = product(true, vec![]);
        let json = serde_json::to_value(ProductSummary::from(&p)).unwrap();
        assert_eq!(json["price"], serde_json::json!("499.00"));
    }

    #[test]
    fn test_variant_at_resolves_position() {
        let p = product(true, vec![variant(0, 3, None), variant(1, 4, None)]);
        assert_eq!(p.variant_at(1).unwrap().quantity, 4);
        assert!(p.variant_at(2).is_none());
    }
}
