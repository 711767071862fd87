// site/src/web/routes.rs

use actix_web::web;

use crate::web::handlers::{
  account_handlers, auth_handlers, cart_handlers, checkout_handlers, contact_handlers, portfolio_handlers,
  shop_handlers,
};

async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

// Called from `main.rs` to mount every service on the Actix App.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api")
      .route("/health", web::get().to(health_check_handler))
      // Accounts and sessions
      .service(
        web::scope("/auth")
          .route("/signup", web::post().to(auth_handlers::signup_handler))
          .route("/signin", web::post().to(auth_handlers::signin_handler))
          .route("/signout", web::post().to(auth_handlers::signout_handler))
          .route("/verify-email", web::post().to(auth_handlers::verify_email_handler))
          .route("/activate/{token}", web::get().to(auth_handlers::activate_email_handler)),
      )
      .service(
        web::resource("/account/profile")
          .route(web::get().to(account_handlers::get_profile_handler))
          .route(web::put().to(account_handlers::update_profile_handler)),
      )
      // Portfolio
      .route("/projects", web::get().to(portfolio_handlers::list_projects_handler))
      .route("/projects/{slug}", web::get().to(portfolio_handlers::project_detail_handler))
      .route("/artworks", web::get().to(portfolio_handlers::list_artworks_handler))
      .route("/artworks/{image_id}", web::get().to(portfolio_handlers::artwork_detail_handler))
      .route("/flash", web::get().to(portfolio_handlers::flash_gallery_handler))
      // Shop
      .route("/shop", web::get().to(shop_handlers::shop_handler))
      .service(
        web::scope("/cart")
          .route("", web::get().to(cart_handlers::view_cart_handler))
          .route("/add", web::post().to(cart_handlers::add_to_cart_handler))
          .route("/update", web::post().to(cart_handlers::update_cart_item_handler))
          .route("/remove", web::post().to(cart_handlers::remove_cart_item_handler)),
      )
      .route(
        "/checkout/session",
        web::post().to(checkout_handlers::create_checkout_session_handler),
      )
      .route("/contact", web::post().to(contact_handlers::contact_handler)),
  );
}

#[cfg(test)]
mod tests {
  use super::*;
  use actix_web::{test, App};

  #[actix_web::test]
  async fn health_route_answers_ok() {
    let app = test::init_service(App::new().configure(configure_app_routes)).await;
    let req = test::TestRequest::get().uri("/api/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
  }

  #[actix_web::test]
  async fn artwork_listing_is_routed() {
    let app = test::init_service(App::new().configure(configure_app_routes)).await;
    for uri in ["/api/artworks", "/api/artworks/3"] {
      let req = test::TestRequest::get().uri(uri).to_request();
      let resp = test::call_service(&app, req).await;
      // No state is registered here, so a routed request fails on extraction.
      assert_ne!(resp.status(), actix_web::http::StatusCode::NOT_FOUND, "{}", uri);
    }
  }
}
