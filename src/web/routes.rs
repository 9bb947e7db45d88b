use actix_web::web;

use crate::web::handlers::{
  auth_handlers, cart_handlers, contact_handlers, order_handlers, product_handlers, user_handlers,
};

async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

/// Configures every route of the API under `/api/v1`.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api/v1")
      .route("/health", web::get().to(health_check_handler))
      .service(
        web::scope("/auth")
          .route("/signup", web::post().to(auth_handlers::signup_handler))
          .route("/login", web::post().to(auth_handlers::login_handler))
          .route("/refresh", web::post().to(auth_handlers::refresh_handler))
          .route("/logout", web::post().to(auth_handlers::logout_handler)),
      )
      .service(
        web::scope("/products")
          .route("", web::get().to(product_handlers::list_products_handler))
          .route("", web::post().to(product_handlers::create_product_handler))
          .route("/{product_id}", web::get().to(product_handlers::get_product_handler))
          .route("/{product_id}", web::put().to(product_handlers::update_product_handler))
          .route(
            "/{product_id}",
            web::delete().to(product_handlers::delete_product_handler),
          ),
      )
      .service(
        web::scope("/cart")
          .route("", web::get().to(cart_handlers::get_cart_handler))
          .route("", web::post().to(cart_handlers::add_to_cart_handler))
          .route(
            "/{cart_item_id}",
            web::delete().to(cart_handlers::remove_from_cart_handler),
          ),
      )
      .service(
        web::scope("/orders")
          .route("", web::post().to(order_handlers::create_order_handler))
          .route("/me", web::get().to(order_handlers::my_orders_handler)),
      )
      .service(
        web::scope("/users")
          .route("/me", web::get().to(user_handlers::get_me_handler))
          .route("/me", web::put().to(user_handlers::update_me_handler)),
      )
      .route("/contact", web::post().to(contact_handlers::contact_handler)),
  );
}
