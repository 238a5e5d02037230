//! Address book: registry-gated saves, defaults, and the three-address cap.
//!
//! Every save validates the pincode against the serviceability registry and
//! backfills locality fields the client left blank. Lookups are cached, so
//! each test seeds its pincodes up front.

use axum::http::StatusCode;
use serde_json::json;

use fabrico_integration_tests::{TestContext, address_payload, serviceable_pincode};

// ============================================================================
// Saving Addresses
// ============================================================================

#[tokio::test]
async fn test_first_address_becomes_default_with_registry_backfill() {
    let ctx = TestContext::new().await;
    ctx.seed_pincode(&serviceable_pincode("416416")).await;
    let user_id = ctx
        .register_user("Asha Patil", "asha@example.com", "correct horse")
        .await;

    let (status, body) = ctx
        .post(
            &format!("/address/{user_id}/addresses"),
            &address_payload("416416"),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    assert!(body["id"].as_i64().expect("Address id is numeric") > 0);
    assert_eq!(body["name"], "Asha Patil");
    assert_eq!(body["mobileNumber"], "9876543210");
    assert_eq!(body["pincode"], "416416");
    assert_eq!(body["addressLine1"], "14 Mill Road");
    // Locality fields come from the registry entry.
    assert_eq!(body["city"], "Sangli");
    assert_eq!(body["taluka"], "Miraj");
    assert_eq!(body["district"], "Sangli");
    assert_eq!(body["state"], "Maharashtra");
    assert_eq!(body["addressType"], "Home");
    assert_eq!(body["isDefault"], true);
    assert!(body["createdAt"].is_string());
    assert!(body.get("userId").is_none());
}

#[tokio::test]
async fn test_later_addresses_are_not_default() {
    let ctx = TestContext::new().await;
    ctx.seed_pincode(&serviceable_pincode("416416")).await;
    let user_id = ctx
        .register_user("Asha Patil", "asha@example.com", "correct horse")
        .await;

    let first = ctx.create_address(user_id, "416416").await;
    let second = ctx.create_address(user_id, "416416").await;

    let (status, body) = ctx.get(&format!("/address/{user_id}/addresses")).await;
    assert_eq!(status, StatusCode::OK);

    let list = body.as_array().expect("Address list is an array");
    assert_eq!(list.len(), 2);
    // Insertion order.
    assert_eq!(list[0]["id"], first);
    assert_eq!(list[0]["isDefault"], true);
    assert_eq!(list[1]["id"], second);
    assert_eq!(list[1]["isDefault"], false);
}

#[tokio::test]
async fn test_address_book_caps_at_three() {
    let ctx = TestContext::new().await;
    ctx.seed_pincode(&serviceable_pincode("416416")).await;
    let user_id = ctx
        .register_user("Asha Patil", "asha@example.com", "correct horse")
        .await;

    for _ in 0..3 {
        ctx.create_address(user_id, "416416").await;
    }

    let (status, body) = ctx
        .post(
            &format!("/address/{user_id}/addresses"),
            &address_payload("416416"),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "You can only save up to 3 addresses");
}

#[tokio::test]
async fn test_submitted_locality_wins_over_registry() {
    let ctx = TestContext::new().await;
    ctx.seed_pincode(&serviceable_pincode("416416")).await;
    let user_id = ctx
        .register_user("Asha Patil", "asha@example.com", "correct horse")
        .await;

    let mut payload = address_payload("416416");
    payload["city"] = json!("Kupwad");

    let (status, body) = ctx
        .post(&format!("/address/{user_id}/addresses"), &payload)
        .await;
    assert_eq!(status, StatusCode::CREATED);
    // What the client typed is kept; only the blanks are filled in.
    assert_eq!(body["city"], "Kupwad");
    assert_eq!(body["taluka"], "Miraj");
    assert_eq!(body["district"], "Sangli");
    assert_eq!(body["state"], "Maharashtra");
}

// ============================================================================
// Serviceability Gate
// ============================================================================

#[tokio::test]
async fn test_rejects_pincodes_outside_the_delivery_area() {
    let ctx = TestContext::new().await;
    let mut no_delivery = serviceable_pincode("416301");
    no_delivery.delivery_available = false;
    ctx.seed_pincode(&no_delivery).await;
    let user_id = ctx
        .register_user("Asha Patil", "asha@example.com", "correct horse")
        .await;

    // Known but marked undeliverable.
    let (status, body) = ctx
        .post(
            &format!("/address/{user_id}/addresses"),
            &address_payload("416301"),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Delivery is not available for this pincode");

    // Entirely unknown to the registry.
    let (status, body) = ctx
        .post(
            &format!("/address/{user_id}/addresses"),
            &address_payload("999999"),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Delivery is not available for this pincode");
}

#[tokio::test]
async fn test_validation_messages() {
    let ctx = TestContext::new().await;
    ctx.seed_pincode(&serviceable_pincode("416416")).await;
    let user_id = ctx
        .register_user("Asha Patil", "asha@example.com", "correct horse")
        .await;
    let path = format!("/address/{user_id}/addresses");

    let mut payload = address_payload("416416");
    payload["name"] = json!("  ");
    let (status, body) = ctx.post(&path, &payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Name is required");

    let mut payload = address_payload("416416");
    payload["addressLine1"] = json!("");
    let (status, body) = ctx.post(&path, &payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Address line is required");

    let mut payload = address_payload("416416");
    payload["mobileNumber"] = json!("12345");
    let (status, body) = ctx.post(&path, &payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "phone number must be exactly 10 digits");

    let (status, body) = ctx.post(&path, &address_payload("123")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "pincode must be exactly 6 digits");
}

// ============================================================================
// Updates
// ============================================================================

#[tokio::test]
async fn test_update_revalidates_and_checks_ownership() {
    let ctx = TestContext::new().await;
    ctx.seed_pincode(&serviceable_pincode("416416")).await;
    ctx.seed_pincode(&serviceable_pincode("415124")).await;
    let user_id = ctx
        .register_user("Asha Patil", "asha@example.com", "correct horse")
        .await;
    let other_id = ctx
        .register_user("Ravi Jadhav", "ravi@example.com", "correct horse")
        .await;

    let address_id = ctx.create_address(user_id, "416416").await;
    let foreign_id = ctx.create_address(other_id, "416416").await;

    // Moving to an unknown pincode fails the registry check.
    let (status, body) = ctx
        .put(
            &format!("/address/{user_id}/addresses/{address_id}"),
            &address_payload("593216"),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Delivery is not available for this pincode");

    let mut payload = address_payload("415124");
    payload["addressLine2"] = json!("behind the water tank");
    let (status, body) = ctx
        .put(
            &format!("/address/{user_id}/addresses/{address_id}"),
            &payload,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], address_id);
    assert_eq!(body["pincode"], "415124");
    assert_eq!(body["addressLine2"], "behind the water tank");

    // Another user's address is invisible here.
    let (status, body) = ctx
        .put(
            &format!("/address/{user_id}/addresses/{foreign_id}"),
            &address_payload("416416"),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Address not found");
}

// ============================================================================
// Defaults
// ============================================================================

#[tokio::test]
async fn test_set_default_swaps_the_flag() {
    let ctx = TestContext::new().await;
    ctx.seed_pincode(&serviceable_pincode("416416")).await;
    let user_id = ctx
        .register_user("Asha Patil", "asha@example.com", "correct horse")
        .await;

    let first = ctx.create_address(user_id, "416416").await;
    let second = ctx.create_address(user_id, "416416").await;

    let (status, body) = ctx
        .put(
            &format!("/address/{user_id}/addresses/{second}/default"),
            &json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let list = body.as_array().expect("Response is the updated list");
    assert_eq!(list[0]["id"], first);
    assert_eq!(list[0]["isDefault"], false);
    assert_eq!(list[1]["id"], second);
    assert_eq!(list[1]["isDefault"], true);
}

#[tokio::test]
async fn test_delete_promotes_the_oldest_remaining_address() {
    let ctx = TestContext::new().await;
    ctx.seed_pincode(&serviceable_pincode("416416")).await;
    let user_id = ctx
        .register_user("Asha Patil", "asha@example.com", "correct horse")
        .await;

    let first = ctx.create_address(user_id, "416416").await;
    let second = ctx.create_address(user_id, "416416").await;
    let third = ctx.create_address(user_id, "416416").await;

    let (status, body) = ctx
        .delete(&format!("/address/{user_id}/addresses/{first}"))
        .await;
    assert_eq!(status, StatusCode::OK);

    let list = body.as_array().expect("Response is the updated list");
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["id"], second);
    assert_eq!(list[0]["isDefault"], true);
    assert_eq!(list[1]["id"], third);
    assert_eq!(list[1]["isDefault"], false);

    // Deleting a non-default address leaves the default alone.
    let (status, body) = ctx
        .delete(&format!("/address/{user_id}/addresses/{third}"))
        .await;
    assert_eq!(status, StatusCode::OK);
    let list = body.as_array().expect("Response is the updated list");
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], second);
    assert_eq!(list[0]["isDefault"], true);

    let (status, body) = ctx
        .delete(&format!("/address/{user_id}/addresses/{second}"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    // Gone addresses stay gone.
    let (status, body) = ctx
        .delete(&format!("/address/{user_id}/addresses/{second}"))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Address not found");
}

// ============================================================================
// Edge Cases
// ============================================================================

#[tokio::test]
async fn test_address_ops_for_unknown_user_are_404() {
    let ctx = TestContext::new().await;
    ctx.seed_pincode(&serviceable_pincode("416416")).await;

    let (status, body) = ctx.get("/address/424242/addresses").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");

    let (status, body) = ctx
        .post("/address/424242/addresses", &address_payload("416416"))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");
}
