use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, patch},
};
use uuid::Uuid;

use crate::{
    dto::products::UpdateVariantRequest,
    error::AppResult,
    middleware::auth::{AuthUser, OptionalUser, ensure_admin},
    models::ProductVariant,
    response::ApiResponse,
    services::variant_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}",
            get(get_variant).put(update_variant).delete(delete_variant),
        )
        .route("/{id}/toggle", patch(toggle_variant))
}

#[utoipa::path(get, path = "/api/variants/{id}", tag = "Variants")]
pub async fn get_variant(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ProductVariant>>> {
    let resp = variant_service::get_variant(&state.pool, user.as_ref(), id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/variants/{id}",
    params(("id" = Uuid, Path, description = "Variant ID")),
    request_body = UpdateVariantRequest,
    responses(
        (status = 200, description = "Updated variant", body = ApiResponse<ProductVariant>),
        (status = 400, description = "Invalid pricing or stock"),
        (status = 404, description = "Variant not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Variants"
)]
pub async fn update_variant(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateVariantRequest>,
) -> AppResult<Json<ApiResponse<ProductVariant>>> {
    ensure_admin(&user)?;
    let resp = variant_service::update_variant(&state.pool, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(delete, path = "/api/variants/{id}", security(("bearer_auth" = [])), tag = "Variants")]
pub async fn delete_variant(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    ensure_admin(&user)?;
    let resp = variant_service::delete_variant(&state.pool, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(patch, path = "/api/variants/{id}/toggle", security(("bearer_auth" = [])), tag = "Variants")]
pub async fn toggle_variant(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ProductVariant>>> {
    ensure_admin(&user)?;
    let resp = variant_service::toggle_variant(&state.pool, id).await?;
    Ok(Json(resp))
}
