use std::collections::HashMap;

use chrono::Utc;
use rand::Rng;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::orders::{CancelOrderRequest, CreateOrderRequest, OrderDetail, OrderList},
    entity::{
        cart_items::{Column as CartItemCol, Entity as CartItems},
        carts::{ActiveModel as CartActive, Column as CartCol, Entity as Carts},
        colors::Entity as Colors,
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        order_status_history::{
            ActiveModel as HistoryActive, Column as HistoryCol, Entity as OrderStatusHistory,
            Model as HistoryModel,
        },
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        product_variants::{Column as VariantCol, Entity as ProductVariants},
        products::Entity as Products,
        shipping_addresses::{Column as AddressCol, Entity as ShippingAddresses},
        sizes::Entity as Sizes,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Order, OrderItem, OrderStatus, PaymentStatus, StatusHistoryEntry},
    pricing::{effective_price, order_totals},
    response::{ApiResponse, Pagination},
    routes::params::{OrderListQuery, SortOrder},
    services::cart_service::first_image,
    state::AppState,
};

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let mut condition = Condition::all().add(OrderCol::UserId.eq(user.user_id));
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(OrderCol::Status.eq(status.clone()));
    }

    let mut finder = Orders::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect();

    Ok(ApiResponse::paginated(
        "Orders",
        OrderList { items: orders },
        Pagination::new(page, limit, total),
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderDetail>> {
    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user.user_id))
                .add(OrderCol::Id.eq(id)),
        )
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".into()))?;

    let detail = order_detail(&state.orm, order).await?;
    Ok(ApiResponse::success("Order", detail))
}

/// Turns the cart into an immutable order snapshot: price and address data
/// are copied, stock is decremented, the cart is emptied. The whole
/// sequence runs in one transaction with the variant rows locked, so a
/// failure at any step leaves nothing half-applied.
pub async fn create_order(
    state: &AppState,
    user: &AuthUser,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<OrderDetail>> {
    let txn = state.orm.begin().await?;

    let cart = Carts::find()
        .filter(CartCol::UserId.eq(user.user_id))
        .one(&txn)
        .await?;
    let cart_items = match &cart {
        Some(cart) => {
            CartItems::find()
                .filter(CartItemCol::CartId.eq(cart.id))
                .all(&txn)
                .await?
        }
        None => Vec::new(),
    };
    if cart_items.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }
    let cart = cart.ok_or_else(|| AppError::BadRequest("Cart is empty".into()))?;

    let address = ShippingAddresses::find()
        .filter(
            Condition::all()
                .add(AddressCol::Id.eq(payload.shipping_address_id))
                .add(AddressCol::UserId.eq(user.user_id)),
        )
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Shipping address not found".into()))?;

    let size_names: HashMap<Uuid, String> = Sizes::find()
        .all(&txn)
        .await?
        .into_iter()
        .map(|s| (s.id, s.name))
        .collect();
    let color_names: HashMap<Uuid, String> = Colors::find()
        .all(&txn)
        .await?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();

    struct Snapshot {
        product_id: Uuid,
        variant_id: Option<Uuid>,
        name: String,
        sku: String,
        size: Option<String>,
        color: Option<String>,
        price: i64,
        quantity: i32,
        total: i64,
        image: Option<String>,
    }

    let mut subtotal: i64 = 0;
    let mut snapshots: Vec<Snapshot> = Vec::with_capacity(cart_items.len());

    for item in &cart_items {
        let product = Products::find_by_id(item.product_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::BadRequest("Product is no longer available".into()))?;
        if !product.is_active {
            return Err(AppError::BadRequest(format!(
                "{} is no longer available",
                product.name
            )));
        }

        let (variant, price, size, color, sku) = match item.variant_id {
            Some(variant_id) => {
                let variant = ProductVariants::find()
                    .filter(VariantCol::Id.eq(variant_id))
                    .lock(LockType::Update)
                    .one(&txn)
                    .await?
                    .ok_or_else(|| {
                        AppError::BadRequest(format!("{} is no longer available", product.name))
                    })?;
                if !variant.is_active {
                    return Err(AppError::BadRequest(format!(
                        "{} is no longer available",
                        product.name
                    )));
                }
                if variant.stock < item.quantity {
                    return Err(AppError::BadRequest(format!(
                        "Insufficient stock for {}",
                        product.name
                    )));
                }
                let price = effective_price(variant.price, variant.discount_price);
                let size = size_names.get(&variant.size_id).cloned();
                let color = color_names.get(&variant.color_id).cloned();
                let sku = variant.sku.clone();
                (Some(variant), price, size, color, sku)
            }
            // Variant-less products sell at base price; the slug stands in
            // for a SKU in the snapshot.
            None => (None, product.base_price, None, None, product.slug.clone()),
        };

        let line_total = price * i64::from(item.quantity);
        subtotal += line_total;
        snapshots.push(Snapshot {
            product_id: product.id,
            variant_id: variant.as_ref().map(|v| v.id),
            name: product.name.clone(),
            sku,
            size,
            color,
            price,
            quantity: item.quantity,
            total: line_total,
            image: first_image(&product.main_images),
        });
    }

    let (shipping_cost, tax, total) = order_totals(subtotal);

    let address_snapshot = serde_json::json!({
        "full_name": address.full_name,
        "phone": address.phone,
        "address_line1": address.address_line1,
        "address_line2": address.address_line2,
        "city": address.city,
        "state": address.state,
        "postal_code": address.postal_code,
        "country": address.country,
    });

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        order_number: Set(build_order_number()),
        shipping_address: Set(address_snapshot),
        subtotal: Set(subtotal),
        shipping_cost: Set(shipping_cost),
        tax: Set(tax),
        total: Set(total),
        status: Set(OrderStatus::Pending.as_str().into()),
        payment_status: Set(PaymentStatus::Pending.as_str().into()),
        payment_method: Set(payload.payment_method),
        notes: Set(payload.notes),
        paid_at: Set(None),
        shipped_at: Set(None),
        delivered_at: Set(None),
        cancelled_at: Set(None),
        cancel_reason: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut items: Vec<OrderItem> = Vec::with_capacity(snapshots.len());
    for snapshot in &snapshots {
        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(snapshot.product_id),
            variant_id: Set(snapshot.variant_id),
            name: Set(snapshot.name.clone()),
            sku: Set(snapshot.sku.clone()),
            size: Set(snapshot.size.clone()),
            color: Set(snapshot.color.clone()),
            price: Set(snapshot.price),
            quantity: Set(snapshot.quantity),
            total: Set(snapshot.total),
            image: Set(snapshot.image.clone()),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
        items.push(order_item_from_entity(item));

        // Stock adjustments key on the variant id, never on a SKU path.
        if let Some(variant_id) = snapshot.variant_id {
            ProductVariants::update_many()
                .col_expr(
                    VariantCol::Stock,
                    Expr::col(VariantCol::Stock).sub(snapshot.quantity),
                )
                .filter(VariantCol::Id.eq(variant_id))
                .exec(&txn)
                .await?;
        }
    }

    append_history(&txn, order.id, OrderStatus::Pending.as_str(), Some("Order created".into()))
        .await?;

    // Empty the cart; the cart row itself survives with a zero total.
    CartItems::delete_many()
        .filter(CartItemCol::CartId.eq(cart.id))
        .exec(&txn)
        .await?;
    let mut cart_active: CartActive = cart.into();
    cart_active.total_amount = Set(0);
    cart_active.updated_at = Set(Utc::now().into());
    cart_active.update(&txn).await?;

    let history = load_history(&txn, order.id).await?;
    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "order_create",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "total": total })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order placed",
        OrderDetail {
            order: order_from_entity(order),
            items,
            status_history: history,
        },
    ))
}

pub async fn cancel_order(
    state: &AppState,
    user: &AuthUser,
    order_id: Uuid,
    payload: CancelOrderRequest,
) -> AppResult<ApiResponse<OrderDetail>> {
    let txn = state.orm.begin().await?;

    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::Id.eq(order_id))
                .add(OrderCol::UserId.eq(user.user_id)),
        )
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".into()))?;

    let status = OrderStatus::parse(&order.status)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("invalid stored status")))?;
    if status == OrderStatus::Cancelled {
        return Err(AppError::BadRequest("Order is already cancelled".into()));
    }
    if !status.is_cancellable() {
        return Err(AppError::BadRequest(
            "Order cannot be cancelled after shipment".into(),
        ));
    }

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .all(&txn)
        .await?;

    // Put the stock back, by variant id.
    for item in &items {
        if let Some(variant_id) = item.variant_id {
            ProductVariants::update_many()
                .col_expr(
                    VariantCol::Stock,
                    Expr::col(VariantCol::Stock).add(item.quantity),
                )
                .filter(VariantCol::Id.eq(variant_id))
                .exec(&txn)
                .await?;
        }
    }

    let reason = payload.reason.unwrap_or_else(|| "Cancelled by customer".into());
    let mut active: OrderActive = order.into();
    active.status = Set(OrderStatus::Cancelled.as_str().into());
    active.cancelled_at = Set(Some(Utc::now().into()));
    active.cancel_reason = Set(Some(reason.clone()));
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&txn).await?;

    append_history(&txn, order.id, OrderStatus::Cancelled.as_str(), Some(reason)).await?;

    let history = load_history(&txn, order.id).await?;
    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "order_cancel",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order cancelled",
        OrderDetail {
            order: order_from_entity(order),
            items: items.into_iter().map(order_item_from_entity).collect(),
            status_history: history,
        },
    ))
}

pub(crate) async fn order_detail<C: ConnectionTrait>(
    conn: &C,
    order: OrderModel,
) -> AppResult<OrderDetail> {
    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .all(conn)
        .await?
        .into_iter()
        .map(order_item_from_entity)
        .collect();
    let history = load_history(conn, order.id).await?;

    Ok(OrderDetail {
        order: order_from_entity(order),
        items,
        status_history: history,
    })
}

pub(crate) async fn append_history<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
    status: &str,
    note: Option<String>,
) -> AppResult<()> {
    HistoryActive {
        id: Set(Uuid::new_v4()),
        order_id: Set(order_id),
        status: Set(status.to_string()),
        note: Set(note),
        created_at: NotSet,
    }
    .insert(conn)
    .await?;
    Ok(())
}

async fn load_history<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
) -> AppResult<Vec<StatusHistoryEntry>> {
    Ok(OrderStatusHistory::find()
        .filter(HistoryCol::OrderId.eq(order_id))
        .order_by_asc(HistoryCol::CreatedAt)
        .all(conn)
        .await?
        .into_iter()
        .map(history_from_entity)
        .collect())
}

pub(crate) fn order_from_entity(model: OrderModel) -> Order {
    Order {
        id: model.id,
        user_id: model.user_id,
        order_number: model.order_number,
        shipping_address: model.shipping_address,
        subtotal: model.subtotal,
        shipping_cost: model.shipping_cost,
        tax: model.tax,
        total: model.total,
        status: model.status,
        payment_status: model.payment_status,
        payment_method: model.payment_method,
        notes: model.notes,
        paid_at: model.paid_at.map(|dt| dt.with_timezone(&Utc)),
        shipped_at: model.shipped_at.map(|dt| dt.with_timezone(&Utc)),
        delivered_at: model.delivered_at.map(|dt| dt.with_timezone(&Utc)),
        cancelled_at: model.cancelled_at.map(|dt| dt.with_timezone(&Utc)),
        cancel_reason: model.cancel_reason,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

pub(crate) fn order_item_from_entity(model: OrderItemModel) -> OrderItem {
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        product_id: model.product_id,
        variant_id: model.variant_id,
        name: model.name,
        sku: model.sku,
        size: model.size,
        color: model.color,
        price: model.price,
        quantity: model.quantity,
        total: model.total,
        image: model.image,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

pub(crate) fn history_from_entity(model: HistoryModel) -> StatusHistoryEntry {
    StatusHistoryEntry {
        id: model.id,
        order_id: model.order_id,
        status: model.status,
        note: model.note,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

/// `ORD` + millisecond timestamp + 3 random digits.
fn build_order_number() -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix: u32 = rand::rng().random_range(0..1000);
    format!("ORD{millis}{suffix:03}")
}

#[cfg(test)]
mod tests {
    use super::build_order_number;

    #[test]
    fn order_number_format() {
        let number = build_order_number();
        assert!(number.starts_with("ORD"));
        let digits = &number[3..];
        assert!(digits.chars().all(|c| c.is_ascii_digit()));
        // 13-digit millis + 3-digit suffix
        assert_eq!(digits.len(), 16);
    }
}
