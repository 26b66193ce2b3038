use chrono::Utc;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    db::DbPool,
    dto::products::{CreateVariantRequest, UpdateVariantRequest, VariantList},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, sees_inactive},
    models::ProductVariant,
    response::ApiResponse,
};

pub async fn list_variants(
    pool: &DbPool,
    user: Option<&AuthUser>,
    product_id: Uuid,
) -> AppResult<ApiResponse<VariantList>> {
    let product: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM products WHERE id = $1 AND ($2 OR is_active)")
            .bind(product_id)
            .bind(sees_inactive(user))
            .fetch_optional(pool)
            .await?;
    if product.is_none() {
        return Err(AppError::NotFound("Product not found".into()));
    }

    let items = sqlx::query_as::<_, ProductVariant>(
        "SELECT * FROM product_variants WHERE product_id = $1 AND ($2 OR is_active) ORDER BY sku",
    )
    .bind(product_id)
    .bind(sees_inactive(user))
    .fetch_all(pool)
    .await?;

    Ok(ApiResponse::success("Variants", VariantList { items }))
}

pub async fn get_variant(
    pool: &DbPool,
    user: Option<&AuthUser>,
    id: Uuid,
) -> AppResult<ApiResponse<ProductVariant>> {
    let variant = sqlx::query_as::<_, ProductVariant>(
        "SELECT * FROM product_variants WHERE id = $1 AND ($2 OR is_active)",
    )
    .bind(id)
    .bind(sees_inactive(user))
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Variant not found".into()))?;

    Ok(ApiResponse::success("Variant", variant))
}

pub async fn create_variant(
    pool: &DbPool,
    user: &AuthUser,
    product_id: Uuid,
    payload: CreateVariantRequest,
) -> AppResult<ApiResponse<ProductVariant>> {
    validate_pricing(payload.price, payload.discount_price, payload.stock)?;

    let product: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM products WHERE id = $1")
        .bind(product_id)
        .fetch_optional(pool)
        .await?;
    if product.is_none() {
        return Err(AppError::NotFound("Product not found".into()));
    }

    let size: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM sizes WHERE id = $1")
        .bind(payload.size_id)
        .fetch_optional(pool)
        .await?;
    if size.is_none() {
        return Err(AppError::BadRequest("Size not found".into()));
    }
    let color: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM colors WHERE id = $1")
        .bind(payload.color_id)
        .fetch_optional(pool)
        .await?;
    if color.is_none() {
        return Err(AppError::BadRequest("Color not found".into()));
    }

    let dup_sku: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM product_variants WHERE sku = $1")
        .bind(payload.sku.as_str())
        .fetch_optional(pool)
        .await?;
    if dup_sku.is_some() {
        return Err(AppError::BadRequest("sku already exists".into()));
    }

    let dup_combo: Option<(Uuid,)> = sqlx::query_as(
        "SELECT id FROM product_variants WHERE product_id = $1 AND size_id = $2 AND color_id = $3",
    )
    .bind(product_id)
    .bind(payload.size_id)
    .bind(payload.color_id)
    .fetch_optional(pool)
    .await?;
    if dup_combo.is_some() {
        return Err(AppError::BadRequest(
            "A variant with this size and color already exists".into(),
        ));
    }

    let variant = sqlx::query_as::<_, ProductVariant>(
        r#"
        INSERT INTO product_variants (id, product_id, size_id, color_id, sku, price, discount_price, stock)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(product_id)
    .bind(payload.size_id)
    .bind(payload.color_id)
    .bind(payload.sku)
    .bind(payload.price)
    .bind(payload.discount_price)
    .bind(payload.stock)
    .fetch_one(pool)
    .await?;

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "variant_create",
        Some("product_variants"),
        Some(serde_json::json!({ "variant_id": variant.id, "product_id": product_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Variant created", variant))
}

pub async fn update_variant(
    pool: &DbPool,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateVariantRequest,
) -> AppResult<ApiResponse<ProductVariant>> {
    let existing = sqlx::query_as::<_, ProductVariant>(
        "SELECT * FROM product_variants WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Variant not found".into()))?;

    let price = payload.price.unwrap_or(existing.price);
    let discount_price = payload.discount_price.or(existing.discount_price);
    let stock = payload.stock.unwrap_or(existing.stock);
    validate_pricing(price, discount_price, stock)?;

    let variant = sqlx::query_as::<_, ProductVariant>(
        r#"
        UPDATE product_variants
        SET price = $2, discount_price = $3, stock = $4, updated_at = $5
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(price)
    .bind(discount_price)
    .bind(stock)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "variant_update",
        Some("product_variants"),
        Some(serde_json::json!({ "variant_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Variant updated", variant))
}

pub async fn delete_variant(
    pool: &DbPool,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = sqlx::query("DELETE FROM product_variants WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Variant not found".into()));
    }

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "variant_delete",
        Some("product_variants"),
        Some(serde_json::json!({ "variant_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Variant deleted", serde_json::json!({})))
}

pub async fn toggle_variant(pool: &DbPool, id: Uuid) -> AppResult<ApiResponse<ProductVariant>> {
    let variant = sqlx::query_as::<_, ProductVariant>(
        "UPDATE product_variants SET is_active = NOT is_active, updated_at = $2 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(Utc::now())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Variant not found".into()))?;
    Ok(ApiResponse::success("Variant toggled", variant))
}

fn validate_pricing(price: i64, discount_price: Option<i64>, stock: i32) -> Result<(), AppError> {
    if price < 0 {
        return Err(AppError::BadRequest("price cannot be negative".into()));
    }
    if let Some(discount) = discount_price {
        if discount >= price {
            return Err(AppError::BadRequest(
                "discount_price must be lower than price".into(),
            ));
        }
    }
    if stock < 0 {
        return Err(AppError::BadRequest("stock cannot be negative".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::validate_pricing;

    #[test]
    fn discount_must_undercut_price() {
        assert!(validate_pricing(100, Some(99), 0).is_ok());
        assert!(validate_pricing(100, Some(100), 0).is_err());
        assert!(validate_pricing(100, None, -1).is_err());
        assert!(validate_pricing(-1, None, 0).is_err());
    }
}
