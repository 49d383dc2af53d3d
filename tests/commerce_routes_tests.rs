mod common;

use axum::http::StatusCode;
use common::{Part, delete, get, json, multipart, spawn_app};
use serde_json::json;

fn cart_item(user_id: i64, product_id: i64) -> serde_json::Value {
    json!({
        "productName": "Trail Shoes",
        "images": ["https://origin.test/shoe.png"],
        "rating": 4.5,
        "price": 19.99,
        "quantity": 2,
        "subtotal": 39.98,
        "productId": product_id,
        "userId": user_id,
    })
}

#[tokio::test]
async fn cart_add_copies_images_and_rejects_duplicates() {
    let t = spawn_app("cart-add").await;

    let (status, body) = json(&t.app, "POST", "/api/cart/add", cart_item(1, 10)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["cartList"]["images"], json!(["https://cdn/1"]));
    assert_eq!(body["cartList"]["imagePublicId"], json!(["pid1"]));
    assert_eq!(
        t.host.uploads.lock().expect("uploads lock").clone(),
        vec!["https://origin.test/shoe.png".to_string()]
    );

    let (status, body) = json(&t.app, "POST", "/api/cart/add", cart_item(1, 10)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Item already added to cart");
    assert_eq!(t.host.upload_count(), 1);

    // Same product in the wishlist is a different basket.
    let (status, body) = json(&t.app, "POST", "/api/mywishlist/add", cart_item(1, 10)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["wishList"]["productId"], 10);

    let (status, body) = get(&t.app, "/api/cart/get/count?userId=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cartCount"], 1);

    let (status, body) = get(&t.app, "/api/cart/get/count").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User ID is required");
}

#[tokio::test]
async fn cart_patch_applies_zero_quantity_and_keeps_images() {
    let t = spawn_app("cart-patch").await;

    let (_, created) = json(&t.app, "POST", "/api/cart/add", cart_item(1, 10)).await;
    let id = created["cartList"]["id"].as_i64().expect("cart id");

    let (status, body) = json(
        &t.app,
        "PATCH",
        &format!("/api/cart/{id}"),
        json!({ "quantity": 0, "subtotal": 0.0 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cartItem"]["quantity"], 0);
    assert_eq!(body["cartItem"]["productName"], "Trail Shoes");
    assert_eq!(body["cartItem"]["images"], json!(["https://cdn/1"]));
    assert!(t.host.deleted().is_empty());

    // Replacing the image list keeps owned URLs and uploads the rest.
    let (status, body) = json(
        &t.app,
        "PATCH",
        &format!("/api/cart/{id}"),
        json!({ "images": ["https://origin.test/other.png"] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cartItem"]["images"], json!(["https://cdn/2"]));
    assert_eq!(t.host.deleted(), vec!["pid1"]);
}

#[tokio::test]
async fn cart_clear_releases_every_item() {
    let t = spawn_app("cart-clear").await;

    json(&t.app, "POST", "/api/cart/add", cart_item(7, 1)).await;
    json(&t.app, "POST", "/api/cart/add", cart_item(7, 2)).await;
    json(&t.app, "POST", "/api/cart/add", cart_item(8, 1)).await;

    let (status, body) = delete(&t.app, "/api/cart/clear/7").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deletedCount"], 2);
    assert_eq!(t.host.deleted(), vec!["pid1", "pid2"]);

    let (status, body) = delete(&t.app, "/api/cart/clear/7").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "No cart items found for the user");

    let (_, body) = get(&t.app, "/api/cart?userId=8").await;
    assert_eq!(body["totalPosts"], 1);
}

#[tokio::test]
async fn order_create_and_delete_manage_line_images() {
    let t = spawn_app("orders").await;

    let (status, body) = json(
        &t.app,
        "POST",
        "/api/orders/create",
        json!({
            "userId": 3,
            "products": [
                {
                    "productName": "Trail Shoes",
                    "images": ["https://origin.test/a.png", "https://origin.test/b.png"],
                    "price": 10.0,
                    "quantity": 1,
                    "subtotal": 10.0,
                    "productId": 1
                },
                {
                    "productName": "Socks",
                    "images": ["https://origin.test/c.png"],
                    "price": 2.0,
                    "quantity": 3,
                    "subtotal": 6.0,
                    "productId": 2
                }
            ]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let order = &body["orderList"];
    assert_eq!(order["userId"], 3);
    assert_eq!(order["products"][0]["imagePublicId"], json!(["pid1", "pid2"]));
    assert_eq!(order["products"][1]["imagePublicId"], json!(["pid3"]));
    assert!(!order["orderId"].as_str().unwrap_or_default().is_empty());
    let id = order["id"].as_i64().expect("order id");

    let (status, body) = get(&t.app, "/api/orders?userId=3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalPosts"], 1);

    let (status, _) = delete(&t.app, &format!("/api/orders/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(t.host.deleted(), vec!["pid1", "pid2", "pid3"]);

    let (status, body) = get(&t.app, &format!("/api/orders/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "No such Order Exists");
}

#[tokio::test]
async fn order_with_incomplete_line_uploads_nothing() {
    let t = spawn_app("orders-invalid").await;

    let (status, body) = json(
        &t.app,
        "POST",
        "/api/orders/create",
        json!({
            "userId": 3,
            "products": [
                { "productName": "Trail Shoes", "images": ["https://origin.test/a.png"], "productId": 1 },
                { "productName": "Socks", "productId": 2 }
            ]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Missing required fields in one of the order products"
    );
    assert_eq!(t.host.upload_count(), 0);
}

#[tokio::test]
async fn signup_signin_and_duplicate_accounts() {
    let t = spawn_app("accounts").await;
    let signup = json!({
        "name": "Ada",
        "email": "ada@example.test",
        "password": "correct horse",
        "phone": "555-0100"
    });

    let (status, body) = json(&t.app, "POST", "/api/user/signup", signup.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "ada@example.test");
    assert!(body["user"].get("password").is_none());
    assert!(body["token"].as_str().is_some_and(|tok| !tok.is_empty()));

    let (status, body) = json(&t.app, "POST", "/api/user/signup", signup).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User already exists..Check email or phone");

    let (status, body) = json(
        &t.app,
        "POST",
        "/api/user/signin",
        json!({ "email": "ada@example.test", "password": "correct horse" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["name"], "Ada");

    let (status, body) = json(
        &t.app,
        "POST",
        "/api/user/signin",
        json!({ "email": "ada@example.test", "password": "wrong" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid Password Credentials");

    // Users and admins live apart.
    let (status, body) = json(
        &t.app,
        "POST",
        "/api/admin/signin",
        json!({ "email": "ada@example.test", "password": "correct horse" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Admin doesnt exist");

    let (_, body) = get(&t.app, "/api/user/get/count").await;
    assert_eq!(body["userCount"], 1);
}

#[tokio::test]
async fn account_avatar_upload_replaces_previous_one() {
    let t = spawn_app("accounts-avatar").await;

    let (_, body) = json(
        &t.app,
        "POST",
        "/api/user/signup",
        json!({ "name": "Ada", "email": "ada@example.test", "password": "pw" }),
    )
    .await;
    let id = body["user"]["id"].as_i64().expect("user id");

    let uri = format!("/api/user/{id}");
    let (status, body) =
        multipart(&t.app, "PATCH", &uri, &[Part::File("images", "me.png")]).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["user"]["image"], "https://cdn/1");

    let (status, body) =
        multipart(&t.app, "PATCH", &uri, &[Part::File("images", "me2.png")]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["imagePublicId"], "pid2");
    assert_eq!(t.host.deleted(), vec!["pid1"]);

    let (status, _) = delete(&t.app, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(t.host.deleted(), vec!["pid1", "pid2"]);
}

#[tokio::test]
async fn reviews_require_an_existing_product() {
    let t = spawn_app("reviews").await;

    let (status, body) = json(
        &t.app,
        "POST",
        "/api/reviews/add",
        json!({ "productId": 42, "customerName": "Ada", "review": "Great", "rating": 5 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "The product doesnt exist");
}

#[tokio::test]
async fn banner_needs_an_image_and_owns_it() {
    let t = spawn_app("banners").await;

    let (status, body) = multipart(&t.app, "POST", "/api/banner/create", &[]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No image uploaded");

    let (status, body) = multipart(
        &t.app,
        "POST",
        "/api/banner/create",
        &[Part::File("images", "hero.png")],
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["bannerImage"]["image"], "https://cdn/1");
    let id = body["bannerImage"]["id"].as_i64().expect("banner id");

    let (status, _) = delete(&t.app, &format!("/api/banner/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(t.host.deleted(), vec!["pid1"]);
}

#[tokio::test]
async fn checkout_goes_through_the_gateway() {
    let t = spawn_app("checkout").await;

    let (status, body) = json(
        &t.app,
        "POST",
        "/api/checkout/create",
        json!({ "products": [] }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No products to check out");

    let (status, body) = json(
        &t.app,
        "POST",
        "/api/checkout/create",
        json!({ "products": [{ "productName": "Trail Shoes", "price": 19.99, "quantity": 2 }] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "cs_test_1");
    assert_eq!(t.payments.carts.lock().expect("carts lock").len(), 1);

    let (status, body) = get(&t.app, "/api/checkout/payment/complete?session_id=cs_test_1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["payment_status"], "paid");
    assert_eq!(body["total_amount"], 39.98);

    let (status, body) = get(&t.app, "/api/checkout/customer/cs_test_1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cart"][0]["productName"], "Trail Shoes");

    let (status, body) = get(&t.app, "/api/checkout/payment/complete").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "session_id is required");
}

#[tokio::test]
async fn checkout_rejects_session_ids_that_are_not_tokens() {
    let t = spawn_app("checkout-session-id").await;

    let (status, body) = get(
        &t.app,
        "/api/checkout/payment/complete?session_id=..%2F..%2Fcustomers%3Flimit%3D100%23",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid session id");

    let (status, body) = get(&t.app, "/api/checkout/customer/..%2Fcus_1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid session id");
}
