use axum::{Router, routing::get};

use crate::state::AppState;

pub mod addresses;
pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod categories;
pub mod doc;
pub mod health;
pub mod orders;
pub mod params;
pub mod products;
pub mod variants;
pub mod wishlist;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/auth", auth::router())
        .nest("/products", products::router())
        .nest("/variants", variants::router())
        .nest("/categories", categories::router())
        .nest("/sizes", catalog::sizes_router())
        .nest("/colors", catalog::colors_router())
        .nest("/carts", cart::router())
        .nest("/addresses", addresses::router())
        .nest("/wishlist", wishlist::router())
        .nest("/orders", orders::router())
        .nest("/admin", admin::router())
}
