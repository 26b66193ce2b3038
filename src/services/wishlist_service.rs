use uuid::Uuid;

use crate::{
    audit::log_audit,
    db::DbPool,
    dto::{
        cart::CartDetail,
        wishlist::{AddWishlistRequest, WishlistCheck, WishlistList},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Product, WishlistItem},
    response::{ApiResponse, Pagination},
    routes::params::Pagination as PageParams,
    services::cart_service,
    state::AppState,
};

pub async fn list_wishlist(
    pool: &DbPool,
    user: &AuthUser,
    pagination: PageParams,
) -> AppResult<ApiResponse<WishlistList>> {
    let (page, limit, offset) = pagination.normalize();
    let products = sqlx::query_as::<_, Product>(
        r#"
        SELECT p.*
        FROM wishlist_items w
        JOIN products p ON p.id = w.product_id
        WHERE w.user_id = $1
        ORDER BY w.created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(user.user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM wishlist_items WHERE user_id = $1")
        .bind(user.user_id)
        .fetch_one(pool)
        .await?;

    let data = WishlistList {
        items: products,
        count: total.0,
    };
    Ok(ApiResponse::paginated(
        "Wishlist",
        data,
        Pagination::new(page, limit, total.0),
    ))
}

pub async fn add_to_wishlist(
    pool: &DbPool,
    user: &AuthUser,
    payload: AddWishlistRequest,
) -> AppResult<ApiResponse<WishlistItem>> {
    let product_exists: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM products WHERE id = $1 AND is_active")
            .bind(payload.product_id)
            .fetch_optional(pool)
            .await?;
    if product_exists.is_none() {
        return Err(AppError::BadRequest("Product not found".into()));
    }

    let existing: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM wishlist_items WHERE user_id = $1 AND product_id = $2")
            .bind(user.user_id)
            .bind(payload.product_id)
            .fetch_optional(pool)
            .await?;
    if existing.is_some() {
        return Err(AppError::BadRequest("Product already in wishlist".into()));
    }

    let item = sqlx::query_as::<_, WishlistItem>(
        r#"
        INSERT INTO wishlist_items (id, user_id, product_id)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user.user_id)
    .bind(payload.product_id)
    .fetch_one(pool)
    .await?;

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "wishlist_add",
        Some("wishlist_items"),
        Some(serde_json::json!({ "product_id": payload.product_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Added to wishlist", item))
}

pub async fn remove_from_wishlist(
    pool: &DbPool,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = sqlx::query("DELETE FROM wishlist_items WHERE user_id = $1 AND product_id = $2")
        .bind(user.user_id)
        .bind(product_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Product not in wishlist".into()));
    }

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "wishlist_remove",
        Some("wishlist_items"),
        Some(serde_json::json!({ "product_id": product_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Removed from wishlist",
        serde_json::json!({}),
    ))
}

pub async fn check_wishlist(
    pool: &DbPool,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<ApiResponse<WishlistCheck>> {
    let existing: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM wishlist_items WHERE user_id = $1 AND product_id = $2")
            .bind(user.user_id)
            .bind(product_id)
            .fetch_optional(pool)
            .await?;

    Ok(ApiResponse::success(
        "Wishlist check",
        WishlistCheck {
            in_wishlist: existing.is_some(),
        },
    ))
}

/// Moves a saved product into the cart: one unit at the product's current
/// price, no variant (the wishlist stores no size/color choice). The
/// wishlist row is only removed once the cart accepted the line.
pub async fn move_to_cart(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<ApiResponse<CartDetail>> {
    let existing: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM wishlist_items WHERE user_id = $1 AND product_id = $2")
            .bind(user.user_id)
            .bind(product_id)
            .fetch_optional(&state.pool)
            .await?;
    if existing.is_none() {
        return Err(AppError::NotFound("Product not in wishlist".into()));
    }

    let cart = cart_service::add_line(state, user, product_id, None, 1).await?;

    sqlx::query("DELETE FROM wishlist_items WHERE user_id = $1 AND product_id = $2")
        .bind(user.user_id)
        .bind(product_id)
        .execute(&state.pool)
        .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "wishlist_move_to_cart",
        Some("wishlist_items"),
        Some(serde_json::json!({ "product_id": product_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Moved to cart", cart))
}
