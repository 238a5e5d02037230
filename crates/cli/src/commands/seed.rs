//! Seed commands for the catalog and the pincode registry.
//!
//! Fixtures are YAML and are validated in full before the database is
//! touched: a bad entry anywhere aborts the run with nothing written.
//!
//! # Catalog fixture
//!
//! ```yaml
//! products:
//!   - name: "Oxford Shirt"
//!     price: "1499.00"
//!     category: "Men"
//!     sub_category: "Shirts"
//!     sizes: ["S", "M", "L"]
//!     variants:
//!       - color: "navy"
//!         quantity: 20
//!         images: ["https://cdn.fabrico.shop/oxford-navy-front.jpg"]
//! ```
//!
//! # Pincode fixture
//!
//! ```yaml
//! pincodes:
//!   - pincode: "416416"
//!     city: "Sangli"
//!     taluka: "Miraj"
//!     district: "Sangli"
//!     state: "Maharashtra"
//! ```

use std::path::Path;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

use fabrico_core::{Category, ColorToken, Pincode};
use fabrico_storefront::db::{self, PincodeRepository, ProductRepository};
use fabrico_storefront::models::catalog::{NewProduct, NewVariant};
use fabrico_storefront::models::pincode::PincodeEntry;

// ===== Fixture Types =====

#[derive(Debug, Deserialize)]
struct CatalogFile {
    products: Vec<ProductSeed>,
}

#[derive(Debug, Deserialize)]
struct ProductSeed {
    name: String,
    #[serde(default)]
    description: Option<String>,
    price: String,
    category: String,
    sub_category: String,
    #[serde(default = "default_true")]
    cod_available: bool,
    #[serde(default)]
    sizes: Vec<String>,
    variants: Vec<VariantSeed>,
}

#[derive(Debug, Deserialize)]
struct VariantSeed {
    color: String,
    quantity: i64,
    #[serde(default)]
    images: Vec<String>,
    #[serde(default)]
    cod_available: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct PincodeFile {
    pincodes: Vec<PincodeSeed>,
}

#[derive(Debug, Deserialize)]
struct PincodeSeed {
    pincode: String,
    city: String,
    taluka: String,
    district: String,
    state: String,
    #[serde(default = "default_true")]
    delivery_available: bool,
}

const fn default_true() -> bool {
    true
}

// ===== Commands =====

/// Seed products and variants from a YAML file.
///
/// # Errors
///
/// Returns an error if the database URL is unset, the file cannot be read,
/// any entry fails validation, or an insert fails.
pub async fn catalog(file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let database_url = super::database_url().ok_or("FABRICO_DATABASE_URL not set")?;

    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading catalog seed file");

    // Parse and validate everything before connecting to the database
    let content = tokio::fs::read_to_string(path).await?;
    let file: CatalogFile = serde_yaml::from_str(&content)?;

    let mut products = Vec::with_capacity(file.products.len());
    for seed in file.products {
        products.push(parse_product(seed)?);
    }

    info!(products = products.len(), "Seed file validated");

    let pool = db::create_pool(&database_url).await?;
    let repo = ProductRepository::new(&pool);

    for product in &products {
        let created = repo.create(product).await?;
        info!(id = %created.id, name = %created.name, "Seeded product");
    }

    info!(products = products.len(), "Catalog seed complete");
    Ok(())
}

/// Seed the serviceable-pincode registry from a YAML file.
///
/// Entries are upserted, so re-running with a refreshed file updates
/// existing pincodes in place.
///
/// # Errors
///
/// Returns an error if the database URL is unset, the file cannot be read,
/// any entry fails validation, or an upsert fails.
pub async fn pincodes(file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let database_url = super::database_url().ok_or("FABRICO_DATABASE_URL not set")?;

    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading pincode seed file");

    let content = tokio::fs::read_to_string(path).await?;
    let file: PincodeFile = serde_yaml::from_str(&content)?;

    let mut entries = Vec::with_capacity(file.pincodes.len());
    for seed in file.pincodes {
        entries.push(parse_pincode(seed)?);
    }

    info!(entries = entries.len(), "Seed file validated");

    let pool = db::create_pool(&database_url).await?;
    let repo = PincodeRepository::new(&pool);

    for entry in &entries {
        repo.upsert(entry).await?;
    }

    info!(entries = entries.len(), "Pincode seed complete");
    Ok(())
}

// ===== Validation =====

fn parse_product(seed: ProductSeed) -> Result<NewProduct, Box<dyn std::error::Error>> {
    let category =
        Category::from_str(&seed.category).map_err(|e| format!("product '{}': {e}", seed.name))?;

    if !category.allows_subcategory(&seed.sub_category) {
        return Err(format!(
            "product '{}': sub-category '{}' is not valid for {category}",
            seed.name, seed.sub_category
        )
        .into());
    }

    let price = Decimal::from_str(&seed.price)
        .map_err(|e| format!("product '{}': invalid price: {e}", seed.name))?;
    if price.is_sign_negative() {
        return Err(format!("product '{}': price cannot be negative", seed.name).into());
    }

    if seed.variants.is_empty() {
        return Err(format!("product '{}': needs at least one variant", seed.name).into());
    }

    let mut variants = Vec::with_capacity(seed.variants.len());
    for v in seed.variants {
        let color =
            ColorToken::parse(&v.color).map_err(|e| format!("product '{}': {e}", seed.name))?;
        if v.quantity < 0 {
            return Err(format!("product '{}': negative stock for '{color}'", seed.name).into());
        }
        for image in &v.images {
            url::Url::parse(image).map_err(|e| {
                format!("product '{}': invalid image URL '{image}': {e}", seed.name)
            })?;
        }
        variants.push(NewVariant {
            color,
            quantity: v.quantity,
            images: v.images,
            cod_available: v.cod_available,
        });
    }

    Ok(NewProduct {
        name: seed.name,
        description: seed.description,
        price,
        category,
        sub_category: seed.sub_category,
        cod_available: seed.cod_available,
        sizes: seed.sizes,
        variants,
    })
}

fn parse_pincode(seed: PincodeSeed) -> Result<PincodeEntry, Box<dyn std::error::Error>> {
    let pincode =
        Pincode::parse(&seed.pincode).map_err(|e| format!("entry '{}': {e}", seed.pincode))?;

    Ok(PincodeEntry {
        pincode,
        city: seed.city,
        taluka: seed.taluka,
        district: seed.district,
        state: seed.state,
        delivery_available: seed.delivery_available,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn shirt_seed() -> ProductSeed {
        ProductSeed {
            name: "Oxford Shirt".to_owned(),
            description: None,
            price: "1499.00".to_owned(),
            category: "Men".to_owned(),
            sub_category: "Shirts".to_owned(),
            cod_available: true,
            sizes: vec!["M".to_owned()],
            variants: vec![VariantSeed {
                color: "navy".to_owned(),
                quantity: 10,
                images: vec!["https://cdn.fabrico.shop/oxford-navy.jpg".to_owned()],
                cod_available: None,
            }],
        }
    }

    #[test]
    fn test_parse_product_valid() {
        let product = parse_product(shirt_seed()).unwrap();
        assert_eq!(product.category, Category::Men);
        assert_eq!(product.variants.len(), 1);
        assert_eq!(product.variants[0].color.as_str(), "navy");
    }

    #[test]
    fn test_parse_product_rejects_wrong_subcategory() {
        let mut seed = shirt_seed();
        seed.sub_category = "Sarees".to_owned();
        let err = parse_product(seed).unwrap_err().to_string();
        assert!(err.contains("not valid for Men"));
    }

    #[test]
    fn test_parse_product_rejects_bad_image_url() {
        let mut seed = shirt_seed();
        seed.variants[0].images = vec!["not a url".to_owned()];
        assert!(parse_product(seed).is_err());
    }

    #[test]
    fn test_parse_product_requires_a_variant() {
        let mut seed = shirt_seed();
        seed.variants.clear();
        let err = parse_product(seed).unwrap_err().to_string();
        assert!(err.contains("at least one variant"));
    }

    #[test]
    fn test_parse_pincode_rejects_short_code() {
        let seed = PincodeSeed {
            pincode: "4164".to_owned(),
            city: "Sangli".to_owned(),
            taluka: "Miraj".to_owned(),
            district: "Sangli".to_owned(),
            state: "Maharashtra".to_owned(),
            delivery_available: true,
        };
        assert!(parse_pincode(seed).is_err());
    }

    #[test]
    fn test_catalog_fixture_deserializes() {
        let yaml = r#"
products:
  - name: "Oxford Shirt"
    price: "1499.00"
    category: "Men"
    sub_category: "Shirts"
    variants:
      - color: "navy"
        quantity: 20
"#;
        let file: CatalogFile = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(file.products.len(), 1);
        // Omitted fields fall back: COD on, no sizes, no images
        assert!(file.products[0].cod_available);
        assert!(file.products[0].sizes.is_empty());
        assert!(file.products[0].variants[0].images.is_empty());
    }
}
