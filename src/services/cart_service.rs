use std::collections::HashMap;

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::cart::{
        CartDetail, CartIssue, CartItemDetail, CartLineInput, CartList, CartValidation,
        SaveCartRequest, VariantSummary,
    },
    entity::{
        cart_items::{ActiveModel as CartItemActive, Column as CartItemCol, Entity as CartItems},
        carts::{ActiveModel as CartActive, Column as CartCol, Entity as Carts, Model as CartModel},
        colors::Entity as Colors,
        product_variants::{Column as VariantCol, Entity as ProductVariants, Model as VariantModel},
        products::{Column as ProdCol, Entity as Products, Model as ProductModel},
        sizes::Entity as Sizes,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Cart,
    pricing::{cart_total, effective_price},
    response::{ApiResponse, Pagination},
    routes::params::Pagination as PageParams,
    state::AppState,
};

pub async fn get_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartDetail>> {
    let cart = Carts::find()
        .filter(CartCol::UserId.eq(user.user_id))
        .one(&state.orm)
        .await?;

    let detail = cart_detail(&state.orm, cart).await?;
    Ok(ApiResponse::success("Cart", detail))
}

/// Admin view over every cart in the system.
pub async fn list_all_carts(
    state: &AppState,
    pagination: PageParams,
) -> AppResult<ApiResponse<CartList>> {
    let (page, limit, offset) = pagination.normalize();

    let finder = Carts::find().order_by_desc(CartCol::UpdatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(cart_from_entity)
        .collect();

    Ok(ApiResponse::paginated(
        "Carts",
        CartList { items },
        Pagination::new(page, limit, total),
    ))
}

pub async fn add_to_cart(
    state: &AppState,
    user: &AuthUser,
    payload: SaveCartRequest,
) -> AppResult<ApiResponse<CartDetail>> {
    if payload.items.is_empty() {
        return Err(AppError::BadRequest("No items to add".into()));
    }
    // payload.total_amount is deliberately unused: the stored total is
    // recomputed from the lines on every save.
    let lines = merge_input_lines(payload.items)?;

    let txn = state.orm.begin().await?;
    let cart = load_or_create_cart(&txn, user.user_id).await?;

    for line in &lines {
        let resolved = resolve_line(&txn, line.product_id, line.variant_id, line.quantity).await?;

        let existing = CartItems::find()
            .filter(CartItemCol::CartId.eq(cart.id))
            .filter(CartItemCol::ProductId.eq(line.product_id))
            .filter(match line.variant_id {
                Some(variant_id) => CartItemCol::VariantId.eq(variant_id),
                None => CartItemCol::VariantId.is_null(),
            })
            .one(&txn)
            .await?;

        match existing {
            Some(item) => {
                let quantity = item.quantity + line.quantity;
                let mut active: CartItemActive = item.into();
                active.quantity = Set(quantity);
                active.update(&txn).await?;
            }
            None => {
                CartItemActive {
                    id: Set(Uuid::new_v4()),
                    cart_id: Set(cart.id),
                    product_id: Set(line.product_id),
                    variant_id: Set(line.variant_id),
                    quantity: Set(line.quantity),
                    price: Set(resolved.price),
                    created_at: NotSet,
                }
                .insert(&txn)
                .await?;
            }
        }
    }

    recompute_total(&txn, cart.id).await?;
    let detail = cart_detail(&txn, Some(cart)).await?;
    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "cart_add",
        Some("cart_items"),
        Some(serde_json::json!({ "lines": lines.len() })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Added to cart", detail))
}

/// Single-line add used by the wishlist move. Returns the refreshed cart.
pub async fn add_line(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    variant_id: Option<Uuid>,
    quantity: i32,
) -> AppResult<CartDetail> {
    let resp = add_to_cart(
        state,
        user,
        SaveCartRequest {
            total_amount: None,
            items: vec![CartLineInput {
                product_id,
                variant_id,
                quantity,
                price: None,
            }],
        },
    )
    .await?;
    resp.data
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("cart response missing data")))
}

/// Replaces the entire item list.
pub async fn update_cart_items(
    state: &AppState,
    user: &AuthUser,
    payload: SaveCartRequest,
) -> AppResult<ApiResponse<CartDetail>> {
    let lines = merge_input_lines(payload.items)?;

    let txn = state.orm.begin().await?;
    let cart = load_or_create_cart(&txn, user.user_id).await?;

    CartItems::delete_many()
        .filter(CartItemCol::CartId.eq(cart.id))
        .exec(&txn)
        .await?;

    for line in &lines {
        let resolved = resolve_line(&txn, line.product_id, line.variant_id, line.quantity).await?;
        CartItemActive {
            id: Set(Uuid::new_v4()),
            cart_id: Set(cart.id),
            product_id: Set(line.product_id),
            variant_id: Set(line.variant_id),
            quantity: Set(line.quantity),
            price: Set(resolved.price),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
    }

    recompute_total(&txn, cart.id).await?;
    let detail = cart_detail(&txn, Some(cart)).await?;
    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "cart_update",
        Some("cart_items"),
        Some(serde_json::json!({ "lines": lines.len() })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Cart updated", detail))
}

pub async fn remove_from_cart(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    variant_id: Option<Uuid>,
) -> AppResult<ApiResponse<CartDetail>> {
    let txn = state.orm.begin().await?;

    let cart = Carts::find()
        .filter(CartCol::UserId.eq(user.user_id))
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Cart not found".into()))?;

    let item = CartItems::find()
        .filter(CartItemCol::CartId.eq(cart.id))
        .filter(CartItemCol::ProductId.eq(product_id))
        .filter(match variant_id {
            Some(variant_id) => CartItemCol::VariantId.eq(variant_id),
            None => CartItemCol::VariantId.is_null(),
        })
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Item not found in cart".into()))?;

    CartItems::delete_by_id(item.id).exec(&txn).await?;
    recompute_total(&txn, cart.id).await?;
    let detail = cart_detail(&txn, Some(cart)).await?;
    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "cart_remove",
        Some("cart_items"),
        Some(serde_json::json!({ "product_id": product_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Removed from cart", detail))
}

/// Re-checks every line against the live catalog: unavailable lines are
/// dropped, stale quantities clamped, stale prices corrected. Corrections
/// are persisted before the report is returned.
pub async fn validate_cart_items(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<CartValidation>> {
    let txn = state.orm.begin().await?;

    let cart = Carts::find()
        .filter(CartCol::UserId.eq(user.user_id))
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Cart not found".into()))?;

    let items = CartItems::find()
        .filter(CartItemCol::CartId.eq(cart.id))
        .all(&txn)
        .await?;

    let mut issues = Vec::new();

    for item in items {
        let issue = |message: &str| CartIssue {
            product_id: item.product_id,
            variant_id: item.variant_id,
            message: message.to_string(),
        };

        let product = Products::find_by_id(item.product_id).one(&txn).await?;
        if !product.map(|p| p.is_active).unwrap_or(false) {
            issues.push(issue("Product no longer available; removed"));
            CartItems::delete_by_id(item.id).exec(&txn).await?;
            continue;
        }

        let Some(variant_id) = item.variant_id else {
            continue;
        };
        let variant = ProductVariants::find_by_id(variant_id).one(&txn).await?;
        let Some(variant) = variant.filter(|v| v.is_active) else {
            issues.push(issue("Variant no longer available; removed"));
            CartItems::delete_by_id(item.id).exec(&txn).await?;
            continue;
        };

        if variant.stock == 0 {
            issues.push(issue("Out of stock; removed"));
            CartItems::delete_by_id(item.id).exec(&txn).await?;
            continue;
        }

        let current_price = effective_price(variant.price, variant.discount_price);
        let clamped = item.quantity.min(variant.stock);
        if item.quantity != clamped || item.price != current_price {
            if item.quantity != clamped {
                issues.push(issue("Quantity reduced to available stock"));
            }
            if item.price != current_price {
                issues.push(issue("Price updated"));
            }
            let mut active: CartItemActive = item.into();
            active.quantity = Set(clamped);
            active.price = Set(current_price);
            active.update(&txn).await?;
        }
    }

    recompute_total(&txn, cart.id).await?;
    let detail = cart_detail(&txn, Some(cart)).await?;
    txn.commit().await?;

    Ok(ApiResponse::success(
        "Cart validated",
        CartValidation {
            issues,
            cart: detail,
        },
    ))
}

struct ResolvedLine {
    price: i64,
}

/// A line only enters the cart while its product is active, its variant (if
/// any) is an active variant of that product, and stock covers the request.
async fn resolve_line<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
    variant_id: Option<Uuid>,
    quantity: i32,
) -> AppResult<ResolvedLine> {
    if quantity < 1 {
        return Err(AppError::BadRequest("quantity must be at least 1".into()));
    }

    let product = Products::find()
        .filter(ProdCol::Id.eq(product_id))
        .one(conn)
        .await?
        .filter(|p| p.is_active)
        .ok_or_else(|| AppError::BadRequest("Product is not available".into()))?;

    let Some(variant_id) = variant_id else {
        return Ok(ResolvedLine {
            price: product.base_price,
        });
    };

    let variant = ProductVariants::find()
        .filter(VariantCol::Id.eq(variant_id))
        .one(conn)
        .await?
        .ok_or_else(|| AppError::BadRequest("Variant not found".into()))?;

    if variant.product_id != product.id {
        return Err(AppError::BadRequest(
            "Variant does not belong to this product".into(),
        ));
    }
    if !variant.is_active {
        return Err(AppError::BadRequest("Variant is not available".into()));
    }
    if variant.stock < quantity {
        return Err(AppError::BadRequest(format!(
            "Insufficient stock for {}",
            variant.sku
        )));
    }

    Ok(ResolvedLine {
        price: effective_price(variant.price, variant.discount_price),
    })
}

async fn load_or_create_cart<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
) -> AppResult<CartModel> {
    let cart = Carts::find()
        .filter(CartCol::UserId.eq(user_id))
        .one(conn)
        .await?;
    if let Some(cart) = cart {
        return Ok(cart);
    }

    let cart = CartActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        total_amount: Set(0),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(conn)
    .await?;
    Ok(cart)
}

/// The persistence-side total recompute: whatever the caller claimed, the
/// stored total is the sum over the lines as they exist right now.
async fn recompute_total<C: ConnectionTrait>(conn: &C, cart_id: Uuid) -> AppResult<i64> {
    let items = CartItems::find()
        .filter(CartItemCol::CartId.eq(cart_id))
        .all(conn)
        .await?;
    let lines: Vec<(i64, i32)> = items.iter().map(|i| (i.price, i.quantity)).collect();
    let total = cart_total(&lines);

    let cart = Carts::find_by_id(cart_id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Cart not found".into()))?;
    let mut active: CartActive = cart.into();
    active.total_amount = Set(total);
    active.updated_at = Set(Utc::now().into());
    active.update(conn).await?;

    Ok(total)
}

async fn cart_detail<C: ConnectionTrait>(
    conn: &C,
    cart: Option<CartModel>,
) -> AppResult<CartDetail> {
    let Some(cart) = cart else {
        return Ok(CartDetail {
            id: None,
            items: Vec::new(),
            total_amount: 0,
        });
    };

    let items = CartItems::find()
        .filter(CartItemCol::CartId.eq(cart.id))
        .order_by_asc(CartItemCol::CreatedAt)
        .all(conn)
        .await?;

    let product_ids: Vec<Uuid> = items.iter().map(|i| i.product_id).collect();
    let products: HashMap<Uuid, ProductModel> = Products::find()
        .filter(ProdCol::Id.is_in(product_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let variant_ids: Vec<Uuid> = items.iter().filter_map(|i| i.variant_id).collect();
    let variants: HashMap<Uuid, VariantModel> = ProductVariants::find()
        .filter(VariantCol::Id.is_in(variant_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|v| (v.id, v))
        .collect();

    let size_names: HashMap<Uuid, String> = Sizes::find()
        .all(conn)
        .await?
        .into_iter()
        .map(|s| (s.id, s.name))
        .collect();
    let color_names: HashMap<Uuid, String> = Colors::find()
        .all(conn)
        .await?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();

    let mut details = Vec::with_capacity(items.len());
    let mut lines = Vec::with_capacity(items.len());
    for item in items {
        let Some(product) = products.get(&item.product_id) else {
            continue;
        };
        let variant = item.variant_id.and_then(|id| variants.get(&id));
        lines.push((item.price, item.quantity));
        details.push(CartItemDetail {
            id: item.id,
            product_id: item.product_id,
            name: product.name.clone(),
            slug: product.slug.clone(),
            image: first_image(&product.main_images),
            variant: variant.map(|v| VariantSummary {
                id: v.id,
                sku: v.sku.clone(),
                size: size_names.get(&v.size_id).cloned(),
                color: color_names.get(&v.color_id).cloned(),
            }),
            quantity: item.quantity,
            price: item.price,
            line_total: item.price * i64::from(item.quantity),
        });
    }

    Ok(CartDetail {
        id: Some(cart.id),
        items: details,
        total_amount: cart_total(&lines),
    })
}

pub(crate) fn first_image(images: &serde_json::Value) -> Option<String> {
    images
        .as_array()
        .and_then(|a| a.first())
        .and_then(|v| v.as_str())
        .map(String::from)
}

fn cart_from_entity(model: CartModel) -> Cart {
    Cart {
        id: model.id,
        user_id: model.user_id,
        total_amount: model.total_amount,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

/// Duplicate (product, variant) pairs in one request collapse into a single
/// line; disagreeing prices for the same pair are a client error.
fn merge_input_lines(items: Vec<CartLineInput>) -> Result<Vec<CartLineInput>, AppError> {
    let mut merged: Vec<CartLineInput> = Vec::new();
    for item in items {
        if item.quantity < 1 {
            return Err(AppError::BadRequest("quantity must be at least 1".into()));
        }
        match merged
            .iter_mut()
            .find(|m| m.product_id == item.product_id && m.variant_id == item.variant_id)
        {
            Some(existing) => {
                if let (Some(a), Some(b)) = (existing.price, item.price) {
                    if a != b {
                        return Err(AppError::BadRequest(
                            "Conflicting prices for the same item".into(),
                        ));
                    }
                }
                existing.quantity += item.quantity;
            }
            None => merged.push(item),
        }
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(product: Uuid, variant: Option<Uuid>, quantity: i32, price: Option<i64>) -> CartLineInput {
        CartLineInput {
            product_id: product,
            variant_id: variant,
            quantity,
            price,
        }
    }

    #[test]
    fn duplicate_lines_merge_by_quantity() {
        let p = Uuid::new_v4();
        let v = Uuid::new_v4();
        let merged = merge_input_lines(vec![
            line(p, Some(v), 2, Some(50)),
            line(p, Some(v), 3, Some(50)),
            line(p, None, 1, None),
        ])
        .unwrap();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].quantity, 5);
        assert_eq!(merged[1].quantity, 1);
    }

    #[test]
    fn conflicting_prices_fail() {
        let p = Uuid::new_v4();
        let v = Uuid::new_v4();
        let result = merge_input_lines(vec![
            line(p, Some(v), 1, Some(50)),
            line(p, Some(v), 1, Some(60)),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let result = merge_input_lines(vec![line(Uuid::new_v4(), None, 0, None)]);
        assert!(result.is_err());
    }

    #[test]
    fn first_image_reads_json_array() {
        assert_eq!(
            first_image(&serde_json::json!(["a.jpg", "b.jpg"])),
            Some("a.jpg".to_string())
        );
        assert_eq!(first_image(&serde_json::json!([])), None);
    }
}
