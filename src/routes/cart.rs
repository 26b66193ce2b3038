use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::cart::{CartDetail, CartList, CartValidation, RemoveItemQuery, SaveCartRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::Pagination,
    services::cart_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_cart))
        .route("/items", post(add_to_cart).put(update_cart_items))
        .route("/items/{product_id}", axum::routing::delete(remove_from_cart))
        .route("/validate", post(validate_cart))
}

#[utoipa::path(
    get,
    path = "/api/carts",
    params(
        ("page" = Option<i64>, Query, description = "Admin only: page number"),
        ("limit" = Option<i64>, Query, description = "Admin only: items per page")
    ),
    responses(
        (status = 200, description = "Own cart with product detail; admins get every cart, paginated", body = ApiResponse<CartDetail>)
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn get_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Response> {
    if user.is_admin() {
        let resp: ApiResponse<CartList> = cart_service::list_all_carts(&state, pagination).await?;
        return Ok(Json(resp).into_response());
    }
    let resp = cart_service::get_cart(&state, &user).await?;
    Ok(Json(resp).into_response())
}

#[utoipa::path(
    post,
    path = "/api/carts/items",
    request_body = SaveCartRequest,
    responses(
        (status = 200, description = "Add items, merging duplicate lines", body = ApiResponse<CartDetail>),
        (status = 400, description = "Inactive product, foreign variant, or insufficient stock"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<SaveCartRequest>,
) -> AppResult<Json<ApiResponse<CartDetail>>> {
    let resp = cart_service::add_to_cart(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/carts/items",
    request_body = SaveCartRequest,
    responses(
        (status = 200, description = "Replace the entire item list", body = ApiResponse<CartDetail>),
        (status = 400, description = "Conflicting prices among duplicate lines"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn update_cart_items(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<SaveCartRequest>,
) -> AppResult<Json<ApiResponse<CartDetail>>> {
    let resp = cart_service::update_cart_items(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/carts/items/{product_id}",
    params(
        ("product_id" = Uuid, Path, description = "Product ID"),
        ("variant_id" = Option<Uuid>, Query, description = "Variant ID of the line")
    ),
    responses(
        (status = 200, description = "Removed line", body = ApiResponse<CartDetail>),
        (status = 404, description = "Cart or line not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<Uuid>,
    Query(query): Query<RemoveItemQuery>,
) -> AppResult<Json<ApiResponse<CartDetail>>> {
    let resp = cart_service::remove_from_cart(&state, &user, product_id, query.variant_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/carts/validate",
    responses(
        (status = 200, description = "Re-check lines against the catalog; corrections are persisted", body = ApiResponse<CartValidation>),
        (status = 404, description = "Cart not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn validate_cart(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<CartValidation>>> {
    let resp = cart_service::validate_cart_items(&state, &user).await?;
    Ok(Json(resp))
}
