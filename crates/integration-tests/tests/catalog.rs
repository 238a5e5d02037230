//! Catalog reads and the public pincode serviceability check.

use axum::http::StatusCode;
use serde_json::json;

use fabrico_integration_tests::{TestContext, serviceable_pincode, test_product};

// ============================================================================
// Product Listing
// ============================================================================

#[tokio::test]
async fn test_listing_is_newest_first() {
    let ctx = TestContext::new().await;
    let shirt = ctx.seed_product(&test_product("Linen Shirt", &[5, 3])).await;
    let jacket = ctx.seed_product(&test_product("Denim Jacket", &[4])).await;

    let (status, body) = ctx.get("/products").await;
    assert_eq!(status, StatusCode::OK);

    let list = body.as_array().expect("Listing is an array");
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["id"], jacket.id.as_i64());
    assert_eq!(list[1]["id"], shirt.id.as_i64());

    let entry = &list[1];
    assert_eq!(entry["name"], "Linen Shirt");
    assert_eq!(entry["price"], "499.00");
    assert_eq!(entry["category"], "Men");
    assert_eq!(entry["subCategory"], "Shirts");
    assert_eq!(entry["image"], "https://cdn.fabrico.shop/test/0.jpg");
    // Stock in the grid is the sum over variants.
    assert_eq!(entry["stock"], 8);
    // The grid view carries no description or variants.
    assert!(entry.get("description").is_none());
    assert!(entry.get("variants").is_none());
}

#[tokio::test]
async fn test_empty_catalog_lists_nothing() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx.get("/products").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

// ============================================================================
// Product Detail
// ============================================================================

#[tokio::test]
async fn test_detail_resolves_cod_per_variant() {
    let ctx = TestContext::new().await;
    let mut new = test_product("Linen Shirt", &[5, 3]);
    new.variants[1].cod_available = Some(false);
    let product = ctx.seed_product(&new).await;

    let (status, body) = ctx.get(&format!("/products/{}", product.id.as_i64())).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(body["id"], product.id.as_i64());
    assert_eq!(body["name"], "Linen Shirt");
    assert_eq!(body["description"], "Linen Shirt from the test catalog");
    assert_eq!(body["price"], "499.00");
    assert_eq!(body["codAvailable"], true);
    assert_eq!(body["sizes"], json!(["S", "M", "L"]));
    assert!(body["createdAt"].is_string());

    let variants = body["variants"].as_array().expect("Detail carries variants");
    assert_eq!(variants.len(), 2);
    assert_eq!(variants[0]["position"], 0);
    assert_eq!(variants[0]["color"], "navy");
    assert_eq!(variants[0]["quantity"], 5);
    assert_eq!(
        variants[0]["images"],
        json!(["https://cdn.fabrico.shop/test/0.jpg"])
    );
    // The product default applies where no override is set.
    assert_eq!(variants[0]["codAvailable"], true);
    assert_eq!(variants[1]["position"], 1);
    assert_eq!(variants[1]["color"], "olive");
    // The variant override wins.
    assert_eq!(variants[1]["codAvailable"], false);
}

#[tokio::test]
async fn test_unknown_product_is_404() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx.get("/products/424242").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Product not found");
}

// ============================================================================
// Pincode Check
// ============================================================================

#[tokio::test]
async fn test_pincode_check_reports_serviceability() {
    let ctx = TestContext::new().await;
    ctx.seed_pincode(&serviceable_pincode("416416")).await;
    let mut no_delivery = serviceable_pincode("416301");
    no_delivery.delivery_available = false;
    ctx.seed_pincode(&no_delivery).await;

    let (status, body) = ctx.get("/pincodes/check/416416").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "valid": true,
            "city": "Sangli",
            "taluka": "Miraj",
            "district": "Sangli",
            "state": "Maharashtra",
        })
    );

    // Known but outside the delivery area.
    let (status, body) = ctx.get("/pincodes/check/416301").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "valid": false }));

    // Unknown to the registry.
    let (status, body) = ctx.get("/pincodes/check/999999").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "valid": false }));

    // Not even a pincode.
    let (status, body) = ctx.get("/pincodes/check/123").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "valid": false }));
}
