//! End-to-end HTTP tests: auth cookie flow, cart rules, ownership checks,
//! checkout and search, all through the actix service.
//!
//! Like the checkout tests, these need `DATABASE_URL` pointing at a Postgres
//! with `schema.sql` applied, and are ignored otherwise.

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{test, web, App};
use rummage::config::AppConfig;
use rummage::state::AppState;
use rummage::web::configure_app_routes;
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use uuid::Uuid;

async fn test_state() -> AppState {
  let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for DB tests");
  let db_pool = PgPoolOptions::new()
    .max_connections(5)
    .connect(&url)
    .await
    .expect("failed to connect to test database");
  let config = AppConfig {
    server_host: "127.0.0.1".into(),
    server_port: 0,
    database_url: url,
    jwt_secret: "integration-test-secret".into(),
    access_token_ttl_secs: 900,
    refresh_token_ttl_secs: 604_800,
    cookie_secure: false,
  };
  AppState {
    db_pool,
    config: Arc::new(config),
  }
}

macro_rules! test_app {
  ($state:expr) => {
    test::init_service(
      App::new()
        .app_data(web::Data::new($state.clone()))
        .configure(configure_app_routes),
    )
    .await
  };
}

/// Signs up a fresh user and returns their access cookie.
async fn signup<S, B>(app: &S) -> Cookie<'static>
where
  S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
  B: MessageBody,
{
  let email = format!("{}@example.com", Uuid::new_v4().simple());
  let req = test::TestRequest::post()
    .uri("/api/v1/auth/signup")
    .set_json(json!({"email": email, "password": "long-enough-pass", "username": "tester"}))
    .to_request();
  let resp = test::call_service(app, req).await;
  assert_eq!(resp.status(), 201, "signup failed");
  resp
    .response()
    .cookies()
    .find(|c| c.name() == "accessToken")
    .expect("signup must set the access cookie")
    .into_owned()
}

async fn create_product<S, B>(app: &S, cookie: &Cookie<'static>, title: &str, price_cents: i64) -> Uuid
where
  S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
  B: MessageBody,
  B::Error: std::fmt::Debug,
{
  let req = test::TestRequest::post()
    .uri("/api/v1/products")
    .cookie(cookie.clone())
    .set_json(json!({
        "title": title,
        "description": "integration test listing",
        "category": "other",
        "price_cents": price_cents
    }))
    .to_request();
  let resp = test::call_service(app, req).await;
  assert_eq!(resp.status(), 201, "create product failed");
  let body: Value = test::read_body_json(resp).await;
  Uuid::parse_str(body["product"]["id"].as_str().unwrap()).unwrap()
}

#[actix_web::test]
#[ignore = "requires Postgres via DATABASE_URL"]
async fn unauthenticated_requests_are_rejected() {
  let state = test_state().await;
  let app = test_app!(state);

  for uri in ["/api/v1/cart", "/api/v1/orders/me", "/api/v1/users/me"] {
    let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
    assert_eq!(resp.status(), 401, "{uri}");
  }
}

#[actix_web::test]
#[ignore = "requires Postgres via DATABASE_URL"]
async fn adding_the_same_product_twice_increments_quantity() {
  let state = test_state().await;
  let app = test_app!(state);
  let seller = signup(&app).await;
  let buyer = signup(&app).await;
  let product_id = create_product(&app, &seller, "Kettle", 3_000).await;

  for _ in 0..2 {
    let req = test::TestRequest::post()
      .uri("/api/v1/cart")
      .cookie(buyer.clone())
      .set_json(json!({"product_id": product_id, "quantity": 1}))
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
  }

  let req = test::TestRequest::get()
    .uri("/api/v1/cart")
    .cookie(buyer.clone())
    .to_request();
  let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
  assert_eq!(body["count"], 1, "no duplicate rows");
  assert_eq!(body["items"][0]["quantity"], 2);
  assert_eq!(body["total_cents"], 6_000);
}

#[actix_web::test]
#[ignore = "requires Postgres via DATABASE_URL"]
async fn own_products_cannot_be_added_to_cart() {
  let state = test_state().await;
  let app = test_app!(state);
  let seller = signup(&app).await;
  let product_id = create_product(&app, &seller, "Mirror", 4_500).await;

  let req = test::TestRequest::post()
    .uri("/api/v1/cart")
    .cookie(seller.clone())
    .set_json(json!({"product_id": product_id}))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), 400);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["error"], "You cannot add your own product to cart");
}

#[actix_web::test]
#[ignore = "requires Postgres via DATABASE_URL"]
async fn checkout_over_http_sells_the_product_and_blocks_later_buyers() {
  let state = test_state().await;
  let app = test_app!(state);
  let seller = signup(&app).await;
  let buyer = signup(&app).await;
  let late_buyer = signup(&app).await;
  let bike = create_product(&app, &seller, "Bike", 500_000).await;

  let req = test::TestRequest::post()
    .uri("/api/v1/cart")
    .cookie(buyer.clone())
    .set_json(json!({"product_id": bike}))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), 201);

  let req = test::TestRequest::post()
    .uri("/api/v1/orders")
    .cookie(buyer.clone())
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), 201);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["order"]["total_cents"], 500_000);
  assert_eq!(body["order"]["items"][0]["product"]["status"], "sold");

  // The buyer's cart is now empty.
  let req = test::TestRequest::get()
    .uri("/api/v1/cart")
    .cookie(buyer.clone())
    .to_request();
  let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
  assert_eq!(body["count"], 0);

  // Anyone arriving after the commit sees the listing as unavailable.
  let req = test::TestRequest::post()
    .uri("/api/v1/cart")
    .cookie(late_buyer.clone())
    .set_json(json!({"product_id": bike}))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), 400);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["error"], "Product is not available");
}

#[actix_web::test]
#[ignore = "requires Postgres via DATABASE_URL"]
async fn only_owners_may_edit_or_delete_resources() {
  let state = test_state().await;
  let app = test_app!(state);
  let seller = signup(&app).await;
  let stranger = signup(&app).await;
  let product_id = create_product(&app, &seller, "Desk", 12_000).await;

  let req = test::TestRequest::put()
    .uri(&format!("/api/v1/products/{product_id}"))
    .cookie(stranger.clone())
    .set_json(json!({"price_cents": 1}))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), 403);

  let req = test::TestRequest::delete()
    .uri(&format!("/api/v1/products/{product_id}"))
    .cookie(stranger.clone())
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), 403);

  // Another user's cart item is likewise off limits.
  let req = test::TestRequest::post()
    .uri("/api/v1/cart")
    .cookie(stranger.clone())
    .set_json(json!({"product_id": product_id}))
    .to_request();
  let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
  let cart_item_id = body["item"]["id"].as_str().unwrap().to_string();

  let req = test::TestRequest::delete()
    .uri(&format!("/api/v1/cart/{cart_item_id}"))
    .cookie(seller.clone())
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), 403);
}

#[actix_web::test]
#[ignore = "requires Postgres via DATABASE_URL"]
async fn category_search_returns_only_available_products_of_that_category() {
  let state = test_state().await;
  let app = test_app!(state);
  let seller = signup(&app).await;

  let marker = Uuid::new_v4().simple().to_string();
  let req = test::TestRequest::post()
    .uri("/api/v1/products")
    .cookie(seller.clone())
    .set_json(json!({
        "title": format!("Jacket {marker}"),
        "description": "warm",
        "category": "clothing",
        "price_cents": 2_500
    }))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), 201);

  let req = test::TestRequest::get()
    .uri(&format!("/api/v1/products?q={marker}&category=clothing"))
    .to_request();
  let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
  let products = body["products"].as_array().unwrap();
  assert_eq!(products.len(), 1);
  for p in products {
    assert_eq!(p["category"], "clothing");
    assert_eq!(p["status"], "available");
  }
}

#[actix_web::test]
#[ignore = "requires Postgres via DATABASE_URL"]
async fn refresh_rotates_both_tokens() {
  let state = test_state().await;
  let app = test_app!(state);

  let email = format!("{}@example.com", Uuid::new_v4().simple());
  let req = test::TestRequest::post()
    .uri("/api/v1/auth/signup")
    .set_json(json!({"email": email, "password": "long-enough-pass"}))
    .to_request();
  let resp = test::call_service(&app, req).await;
  let refresh = resp
    .response()
    .cookies()
    .find(|c| c.name() == "refreshToken")
    .unwrap()
    .into_owned();

  let req = test::TestRequest::post()
    .uri("/api/v1/auth/refresh")
    .cookie(refresh.clone())
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), 200);
  let names: Vec<String> = resp.response().cookies().map(|c| c.name().to_string()).collect();
  assert!(names.contains(&"accessToken".to_string()));
  assert!(names.contains(&"refreshToken".to_string()));

  // An access cookie does not pass as a refresh token.
  let resp = test::call_service(
    &app,
    test::TestRequest::post().uri("/api/v1/auth/refresh").to_request(),
  )
  .await;
  assert_eq!(resp.status(), 401);
}
