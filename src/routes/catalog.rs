//! Size and color lookup endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, patch},
};
use uuid::Uuid;

use crate::{
    dto::catalog::{
        ColorList, CreateColorRequest, CreateSizeRequest, SizeList, UpdateColorRequest,
        UpdateSizeRequest,
    },
    error::AppResult,
    middleware::auth::{AuthUser, OptionalUser, ensure_admin},
    models::{Color, Size},
    response::ApiResponse,
    services::catalog_service,
    state::AppState,
};

pub fn sizes_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_sizes).post(create_size))
        .route("/{id}", axum::routing::put(update_size).delete(delete_size))
        .route("/{id}/toggle", patch(toggle_size))
}

pub fn colors_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_colors).post(create_color))
        .route("/{id}", axum::routing::put(update_color).delete(delete_color))
        .route("/{id}/toggle", patch(toggle_color))
}

#[utoipa::path(get, path = "/api/sizes", tag = "Catalog")]
pub async fn list_sizes(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
) -> AppResult<Json<ApiResponse<SizeList>>> {
    let resp = catalog_service::list_sizes(&state.pool, user.as_ref()).await?;
    Ok(Json(resp))
}

#[utoipa::path(post, path = "/api/sizes", request_body = CreateSizeRequest, security(("bearer_auth" = [])), tag = "Catalog")]
pub async fn create_size(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateSizeRequest>,
) -> AppResult<Json<ApiResponse<Size>>> {
    ensure_admin(&user)?;
    let resp = catalog_service::create_size(&state.pool, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(put, path = "/api/sizes/{id}", request_body = UpdateSizeRequest, security(("bearer_auth" = [])), tag = "Catalog")]
pub async fn update_size(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSizeRequest>,
) -> AppResult<Json<ApiResponse<Size>>> {
    ensure_admin(&user)?;
    let resp = catalog_service::update_size(&state.pool, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(delete, path = "/api/sizes/{id}", security(("bearer_auth" = [])), tag = "Catalog")]
pub async fn delete_size(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    ensure_admin(&user)?;
    let resp = catalog_service::delete_size(&state.pool, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(patch, path = "/api/sizes/{id}/toggle", security(("bearer_auth" = [])), tag = "Catalog")]
pub async fn toggle_size(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Size>>> {
    ensure_admin(&user)?;
    let resp = catalog_service::toggle_size(&state.pool, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(get, path = "/api/colors", tag = "Catalog")]
pub async fn list_colors(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
) -> AppResult<Json<ApiResponse<ColorList>>> {
    let resp = catalog_service::list_colors(&state.pool, user.as_ref()).await?;
    Ok(Json(resp))
}

#[utoipa::path(post, path = "/api/colors", request_body = CreateColorRequest, security(("bearer_auth" = [])), tag = "Catalog")]
pub async fn create_color(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateColorRequest>,
) -> AppResult<Json<ApiResponse<Color>>> {
    ensure_admin(&user)?;
    let resp = catalog_service::create_color(&state.pool, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(put, path = "/api/colors/{id}", request_body = UpdateColorRequest, security(("bearer_auth" = [])), tag = "Catalog")]
pub async fn update_color(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateColorRequest>,
) -> AppResult<Json<ApiResponse<Color>>> {
    ensure_admin(&user)?;
    let resp = catalog_service::update_color(&state.pool, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(delete, path = "/api/colors/{id}", security(("bearer_auth" = [])), tag = "Catalog")]
pub async fn delete_color(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    ensure_admin(&user)?;
    let resp = catalog_service::delete_color(&state.pool, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(patch, path = "/api/colors/{id}/toggle", security(("bearer_auth" = [])), tag = "Catalog")]
pub async fn toggle_color(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Color>>> {
    ensure_admin(&user)?;
    let resp = catalog_service::toggle_color(&state.pool, id).await?;
    Ok(Json(resp))
}
