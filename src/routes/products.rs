use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch},
};
use uuid::Uuid;

use crate::{
    dto::products::{
        CreateProductRequest, CreateVariantRequest, ProductDetail, ProductList,
        UpdateProductRequest, VariantList,
    },
    error::AppResult,
    middleware::auth::{AuthUser, OptionalUser, ensure_admin},
    models::{Product, ProductVariant},
    response::ApiResponse,
    routes::params::ProductListQuery,
    services::{product_service, variant_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/{id}/toggle", patch(toggle_product))
        .route("/{id}/variants", get(list_variants).post(create_variant))
}

#[utoipa::path(
    get,
    path = "/api/products",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("limit" = Option<i64>, Query, description = "Items per page, default 10"),
        ("q" = Option<String>, Query, description = "Search in product names"),
        ("category_id" = Option<Uuid>, Query, description = "Filter by category"),
        ("featured" = Option<bool>, Query, description = "Filter by featured flag")
    ),
    responses(
        (status = 200, description = "List products", body = ApiResponse<ProductList>)
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    Query(query): Query<ProductListQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = product_service::list_products(&state.pool, user.as_ref(), query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product with variants and projections", body = ApiResponse<ProductDetail>),
        (status = 404, description = "Product not found"),
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ProductDetail>>> {
    let resp = product_service::get_product(&state.pool, user.as_ref(), id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/products",
    request_body = CreateProductRequest,
    responses(
        (status = 200, description = "Create product", body = ApiResponse<Product>),
        (status = 400, description = "Duplicate name or bad payload"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateProductRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    ensure_admin(&user)?;
    let resp = product_service::create_product(&state.pool, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Updated product", body = ApiResponse<Product>),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    ensure_admin(&user)?;
    let resp = product_service::update_product(&state.pool, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Deleted product and its variants"),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    ensure_admin(&user)?;
    let resp = product_service::delete_product(&state.pool, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(patch, path = "/api/products/{id}/toggle", security(("bearer_auth" = [])), tag = "Products")]
pub async fn toggle_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Product>>> {
    ensure_admin(&user)?;
    let resp = product_service::toggle_product(&state.pool, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}/variants",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "List product variants", body = ApiResponse<VariantList>),
        (status = 404, description = "Product not found"),
    ),
    tag = "Variants"
)]
pub async fn list_variants(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<VariantList>>> {
    let resp = variant_service::list_variants(&state.pool, user.as_ref(), id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/products/{id}/variants",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = CreateVariantRequest,
    responses(
        (status = 200, description = "Create variant", body = ApiResponse<ProductVariant>),
        (status = 400, description = "Duplicate SKU or size/color combination"),
    ),
    security(("bearer_auth" = [])),
    tag = "Variants"
)]
pub async fn create_variant(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateVariantRequest>,
) -> AppResult<Json<ApiResponse<ProductVariant>>> {
    ensure_admin(&user)?;
    let resp = variant_service::create_variant(&state.pool, &user, id, payload).await?;
    Ok(Json(resp))
}
