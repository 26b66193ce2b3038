use chrono::Utc;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    db::DbPool,
    dto::addresses::{AddressList, CreateAddressRequest, UpdateAddressRequest},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::ShippingAddress,
    response::ApiResponse,
};

pub async fn list_addresses(
    pool: &DbPool,
    user: &AuthUser,
) -> AppResult<ApiResponse<AddressList>> {
    let items = sqlx::query_as::<_, ShippingAddress>(
        "SELECT * FROM shipping_addresses WHERE user_id = $1 ORDER BY is_default DESC, created_at DESC",
    )
    .bind(user.user_id)
    .fetch_all(pool)
    .await?;

    Ok(ApiResponse::success("Addresses", AddressList { items }))
}

pub async fn get_address(
    pool: &DbPool,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<ShippingAddress>> {
    let address = sqlx::query_as::<_, ShippingAddress>(
        "SELECT * FROM shipping_addresses WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(user.user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Address not found".into()))?;

    Ok(ApiResponse::success("Address", address))
}

pub async fn create_address(
    pool: &DbPool,
    user: &AuthUser,
    payload: CreateAddressRequest,
) -> AppResult<ApiResponse<ShippingAddress>> {
    if payload.is_default {
        unset_defaults(pool, user.user_id).await?;
    }

    let address = sqlx::query_as::<_, ShippingAddress>(
        r#"
        INSERT INTO shipping_addresses
            (id, user_id, full_name, phone, address_line1, address_line2,
             city, state, postal_code, country, is_default)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user.user_id)
    .bind(payload.full_name)
    .bind(payload.phone)
    .bind(payload.address_line1)
    .bind(payload.address_line2)
    .bind(payload.city)
    .bind(payload.state)
    .bind(payload.postal_code)
    .bind(payload.country)
    .bind(payload.is_default)
    .fetch_one(pool)
    .await?;

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "address_create",
        Some("shipping_addresses"),
        Some(serde_json::json!({ "address_id": address.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Address created", address))
}

pub async fn update_address(
    pool: &DbPool,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateAddressRequest,
) -> AppResult<ApiResponse<ShippingAddress>> {
    let existing = sqlx::query_as::<_, ShippingAddress>(
        "SELECT * FROM shipping_addresses WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(user.user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Address not found".into()))?;

    let is_default = payload.is_default.unwrap_or(existing.is_default);
    if is_default {
        // Siblings first, so the invariant holds even if this save fails.
        unset_defaults(pool, user.user_id).await?;
    }

    let address = sqlx::query_as::<_, ShippingAddress>(
        r#"
        UPDATE shipping_addresses
        SET full_name = $3, phone = $4, address_line1 = $5, address_line2 = $6,
            city = $7, state = $8, postal_code = $9, country = $10,
            is_default = $11, updated_at = $12
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(user.user_id)
    .bind(payload.full_name.unwrap_or(existing.full_name))
    .bind(payload.phone.unwrap_or(existing.phone))
    .bind(payload.address_line1.unwrap_or(existing.address_line1))
    .bind(payload.address_line2.or(existing.address_line2))
    .bind(payload.city.unwrap_or(existing.city))
    .bind(payload.state.or(existing.state))
    .bind(payload.postal_code.unwrap_or(existing.postal_code))
    .bind(payload.country.unwrap_or(existing.country))
    .bind(is_default)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "address_update",
        Some("shipping_addresses"),
        Some(serde_json::json!({ "address_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Address updated", address))
}

pub async fn delete_address(
    pool: &DbPool,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let existing = sqlx::query_as::<_, ShippingAddress>(
        "SELECT * FROM shipping_addresses WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(user.user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Address not found".into()))?;

    sqlx::query("DELETE FROM shipping_addresses WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    // The most recently created survivor inherits the default flag.
    if existing.is_default {
        sqlx::query(
            r#"
            UPDATE shipping_addresses SET is_default = TRUE
            WHERE id = (
                SELECT id FROM shipping_addresses
                WHERE user_id = $1
                ORDER BY created_at DESC
                LIMIT 1
            )
            "#,
        )
        .bind(user.user_id)
        .execute(pool)
        .await?;
    }

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "address_delete",
        Some("shipping_addresses"),
        Some(serde_json::json!({ "address_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Address deleted", serde_json::json!({})))
}

async fn unset_defaults(pool: &DbPool, user_id: Uuid) -> AppResult<()> {
    sqlx::query("UPDATE shipping_addresses SET is_default = FALSE WHERE user_id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}
