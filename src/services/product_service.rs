use chrono::Utc;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    db::DbPool,
    dto::products::{
        CreateProductRequest, PriceRange, ProductDetail, ProductList, UpdateProductRequest,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, sees_inactive},
    models::{Product, ProductVariant},
    pricing::effective_price,
    response::{ApiResponse, FieldError, Pagination},
    routes::params::{ProductListQuery, SortOrder},
    services::slugify,
};

pub const MAX_MAIN_IMAGES: usize = 5;

pub async fn list_products(
    pool: &DbPool,
    user: Option<&AuthUser>,
    query: ProductListQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let all_visible = sees_inactive(user);
    let search = query.q.map(|q| format!("%{q}%"));
    let order = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    };

    let sql = format!(
        r#"
        SELECT * FROM products
        WHERE ($1 OR is_active)
          AND ($2::text IS NULL OR name ILIKE $2)
          AND ($3::uuid IS NULL OR category_id = $3)
          AND ($4::bool IS NULL OR is_featured = $4)
        ORDER BY created_at {order}
        LIMIT $5 OFFSET $6
        "#
    );
    let items = sqlx::query_as::<_, Product>(&sql)
        .bind(all_visible)
        .bind(search.as_deref())
        .bind(query.category_id)
        .bind(query.featured)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

    let total: (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*) FROM products
        WHERE ($1 OR is_active)
          AND ($2::text IS NULL OR name ILIKE $2)
          AND ($3::uuid IS NULL OR category_id = $3)
          AND ($4::bool IS NULL OR is_featured = $4)
        "#,
    )
    .bind(all_visible)
    .bind(search.as_deref())
    .bind(query.category_id)
    .bind(query.featured)
    .fetch_one(pool)
    .await?;

    Ok(ApiResponse::paginated(
        "Products",
        ProductList { items },
        Pagination::new(page, limit, total.0),
    ))
}

pub async fn get_product(
    pool: &DbPool,
    user: Option<&AuthUser>,
    id: Uuid,
) -> AppResult<ApiResponse<ProductDetail>> {
    let product =
        sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1 AND ($2 OR is_active)")
            .bind(id)
            .bind(sees_inactive(user))
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".into()))?;

    let variants = sqlx::query_as::<_, ProductVariant>(
        "SELECT * FROM product_variants WHERE product_id = $1 AND ($2 OR is_active) ORDER BY sku",
    )
    .bind(id)
    .bind(sees_inactive(user))
    .fetch_all(pool)
    .await?;

    let price_range = price_range(product.base_price, &variants);
    let total_stock = total_stock(&variants);

    Ok(ApiResponse::success(
        "Product",
        ProductDetail {
            product,
            variants,
            price_range,
            total_stock,
        },
    ))
}

pub async fn create_product(
    pool: &DbPool,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    if payload.main_images.len() > MAX_MAIN_IMAGES {
        return Err(AppError::Validation(vec![FieldError::new(
            "main_images",
            format!("A product can have at most {MAX_MAIN_IMAGES} images"),
        )]));
    }

    let category: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM categories WHERE id = $1")
        .bind(payload.category_id)
        .fetch_optional(pool)
        .await?;
    if category.is_none() {
        return Err(AppError::BadRequest("Category not found".into()));
    }

    let slug = slugify(&payload.name);
    let exist: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM products WHERE slug = $1")
        .bind(slug.as_str())
        .fetch_optional(pool)
        .await?;
    if exist.is_some() {
        return Err(AppError::BadRequest(
            "A product with this name already exists".into(),
        ));
    }

    let product = sqlx::query_as::<_, Product>(
        r#"
        INSERT INTO products (id, name, slug, description, category_id, base_price, main_images, is_featured)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(payload.name)
    .bind(slug)
    .bind(payload.description)
    .bind(payload.category_id)
    .bind(payload.base_price)
    .bind(sqlx::types::Json(payload.main_images))
    .bind(payload.is_featured)
    .fetch_one(pool)
    .await?;

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "product_create",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Product created", product))
}

pub async fn update_product(
    pool: &DbPool,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    let existing = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;

    if let Some(images) = &payload.main_images {
        if images.len() > MAX_MAIN_IMAGES {
            return Err(AppError::Validation(vec![FieldError::new(
                "main_images",
                format!("A product can have at most {MAX_MAIN_IMAGES} images"),
            )]));
        }
    }

    if let Some(category_id) = payload.category_id {
        let category: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM categories WHERE id = $1")
            .bind(category_id)
            .fetch_optional(pool)
            .await?;
        if category.is_none() {
            return Err(AppError::BadRequest("Category not found".into()));
        }
    }

    let name = payload.name.unwrap_or(existing.name);
    let slug = slugify(&name);
    let description = payload.description.or(existing.description);
    let category_id = payload.category_id.unwrap_or(existing.category_id);
    let base_price = payload.base_price.unwrap_or(existing.base_price);
    let main_images = payload
        .main_images
        .map(sqlx::types::Json)
        .unwrap_or(existing.main_images);
    let is_featured = payload.is_featured.unwrap_or(existing.is_featured);

    let product = sqlx::query_as::<_, Product>(
        r#"
        UPDATE products
        SET name = $2, slug = $3, description = $4, category_id = $5,
            base_price = $6, main_images = $7, is_featured = $8, updated_at = $9
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(slug)
    .bind(description)
    .bind(category_id)
    .bind(base_price)
    .bind(main_images)
    .bind(is_featured)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "product_update",
        Some("products"),
        Some(serde_json::json!({ "product_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Product updated", product))
}

/// Variants go with the product (FK cascade).
pub async fn delete_product(
    pool: &DbPool,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Product not found".into()));
    }

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "product_delete",
        Some("products"),
        Some(serde_json::json!({ "product_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Product deleted", serde_json::json!({})))
}

pub async fn toggle_product(
    pool: &DbPool,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Product>> {
    let product = sqlx::query_as::<_, Product>(
        "UPDATE products SET is_active = NOT is_active, updated_at = $2 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(Utc::now())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Product not found".into()))?;

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "product_toggle",
        Some("products"),
        Some(serde_json::json!({ "product_id": id, "is_active": product.is_active })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Product toggled", product))
}

/// Min/max selling price over active variants, falling back to the base
/// price for variant-less products. Computed at read time, never stored.
fn price_range(base_price: i64, variants: &[ProductVariant]) -> PriceRange {
    let prices: Vec<i64> = variants
        .iter()
        .filter(|v| v.is_active)
        .map(|v| effective_price(v.price, v.discount_price))
        .collect();
    match (prices.iter().min(), prices.iter().max()) {
        (Some(&min), Some(&max)) => PriceRange { min, max },
        _ => PriceRange {
            min: base_price,
            max: base_price,
        },
    }
}

fn total_stock(variants: &[ProductVariant]) -> i64 {
    variants
        .iter()
        .filter(|v| v.is_active)
        .map(|v| i64::from(v.stock))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn variant(price: i64, discount: Option<i64>, stock: i32, active: bool) -> ProductVariant {
        ProductVariant {
            id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            size_id: Uuid::new_v4(),
            color_id: Uuid::new_v4(),
            sku: "SKU".into(),
            price,
            discount_price: discount,
            stock,
            is_active: active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn price_range_uses_effective_prices() {
        let variants = [
            variant(100, Some(80), 3, true),
            variant(120, None, 2, true),
            variant(10, None, 9, false),
        ];
        let range = price_range(50, &variants);
        assert_eq!(range.min, 80);
        assert_eq!(range.max, 120);
    }

    #[test]
    fn price_range_falls_back_to_base_price() {
        let range = price_range(50, &[]);
        assert_eq!((range.min, range.max), (50, 50));
    }

    #[test]
    fn total_stock_skips_inactive_variants() {
        let variants = [variant(1, None, 3, true), variant(1, None, 5, false)];
        assert_eq!(total_stock(&variants), 3);
    }
}
