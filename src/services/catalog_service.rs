//! Size and color lookup tables for product variants.

use uuid::Uuid;

use crate::{
    audit::log_audit,
    db::DbPool,
    dto::catalog::{
        ColorList, CreateColorRequest, CreateSizeRequest, SizeList, UpdateColorRequest,
        UpdateSizeRequest,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, sees_inactive},
    models::{Color, Size},
    response::ApiResponse,
};

pub async fn list_sizes(
    pool: &DbPool,
    user: Option<&AuthUser>,
) -> AppResult<ApiResponse<SizeList>> {
    let items = sqlx::query_as::<_, Size>(
        "SELECT * FROM sizes WHERE ($1 OR is_active) ORDER BY sort_order, name",
    )
    .bind(sees_inactive(user))
    .fetch_all(pool)
    .await?;
    Ok(ApiResponse::success("Sizes", SizeList { items }))
}

pub async fn create_size(
    pool: &DbPool,
    user: &AuthUser,
    payload: CreateSizeRequest,
) -> AppResult<ApiResponse<Size>> {
    let exist: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM sizes WHERE name = $1 OR code = $2")
            .bind(payload.name.as_str())
            .bind(payload.code.as_str())
            .fetch_optional(pool)
            .await?;
    if exist.is_some() {
        return Err(AppError::BadRequest(
            "A size with this name or code already exists".into(),
        ));
    }

    let size = sqlx::query_as::<_, Size>(
        "INSERT INTO sizes (id, name, code, sort_order) VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(payload.name)
    .bind(payload.code)
    .bind(payload.sort_order.unwrap_or(0))
    .fetch_one(pool)
    .await?;

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "size_create",
        Some("sizes"),
        Some(serde_json::json!({ "size_id": size.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Size created", size))
}

pub async fn update_size(
    pool: &DbPool,
    id: Uuid,
    payload: UpdateSizeRequest,
) -> AppResult<ApiResponse<Size>> {
    let existing = sqlx::query_as::<_, Size>("SELECT * FROM sizes WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Size not found".into()))?;

    let size = sqlx::query_as::<_, Size>(
        "UPDATE sizes SET name = $2, code = $3, sort_order = $4 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(payload.name.unwrap_or(existing.name))
    .bind(payload.code.unwrap_or(existing.code))
    .bind(payload.sort_order.unwrap_or(existing.sort_order))
    .fetch_one(pool)
    .await?;

    Ok(ApiResponse::success("Size updated", size))
}

pub async fn delete_size(
    pool: &DbPool,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = sqlx::query("DELETE FROM sizes WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Size not found".into()));
    }

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "size_delete",
        Some("sizes"),
        Some(serde_json::json!({ "size_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Size deleted", serde_json::json!({})))
}

pub async fn toggle_size(pool: &DbPool, id: Uuid) -> AppResult<ApiResponse<Size>> {
    let size = sqlx::query_as::<_, Size>(
        "UPDATE sizes SET is_active = NOT is_active WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Size not found".into()))?;
    Ok(ApiResponse::success("Size toggled", size))
}

pub async fn list_colors(
    pool: &DbPool,
    user: Option<&AuthUser>,
) -> AppResult<ApiResponse<ColorList>> {
    let items = sqlx::query_as::<_, Color>(
        "SELECT * FROM colors WHERE ($1 OR is_active) ORDER BY name",
    )
    .bind(sees_inactive(user))
    .fetch_all(pool)
    .await?;
    Ok(ApiResponse::success("Colors", ColorList { items }))
}

pub async fn create_color(
    pool: &DbPool,
    user: &AuthUser,
    payload: CreateColorRequest,
) -> AppResult<ApiResponse<Color>> {
    let exist: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM colors WHERE name = $1 OR hex_code = $2")
            .bind(payload.name.as_str())
            .bind(payload.hex_code.as_str())
            .fetch_optional(pool)
            .await?;
    if exist.is_some() {
        return Err(AppError::BadRequest(
            "A color with this name or hex code already exists".into(),
        ));
    }

    let color = sqlx::query_as::<_, Color>(
        "INSERT INTO colors (id, name, hex_code) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(payload.name)
    .bind(payload.hex_code)
    .fetch_one(pool)
    .await?;

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "color_create",
        Some("colors"),
        Some(serde_json::json!({ "color_id": color.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Color created", color))
}

pub async fn update_color(
    pool: &DbPool,
    id: Uuid,
    payload: UpdateColorRequest,
) -> AppResult<ApiResponse<Color>> {
    let existing = sqlx::query_as::<_, Color>("SELECT * FROM colors WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Color not found".into()))?;

    let color = sqlx::query_as::<_, Color>(
        "UPDATE colors SET name = $2, hex_code = $3 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(payload.name.unwrap_or(existing.name))
    .bind(payload.hex_code.unwrap_or(existing.hex_code))
    .fetch_one(pool)
    .await?;

    Ok(ApiResponse::success("Color updated", color))
}

pub async fn delete_color(
    pool: &DbPool,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = sqlx::query("DELETE FROM colors WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Color not found".into()));
    }

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "color_delete",
        Some("colors"),
        Some(serde_json::json!({ "color_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Color deleted", serde_json::json!({})))
}

pub async fn toggle_color(pool: &DbPool, id: Uuid) -> AppResult<ApiResponse<Color>> {
    let color = sqlx::query_as::<_, Color>(
        "UPDATE colors SET is_active = NOT is_active WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Color not found".into()))?;
    Ok(ApiResponse::success("Color toggled", color))
}
