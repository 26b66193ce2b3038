use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::orders::{MonthlySale, MonthlySales, OrderDetail, OrderList, OrderStats, StatusStat},
    entity::orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Order, OrderStatus, PaymentStatus},
    response::{ApiResponse, Pagination},
    routes::params::{OrderListQuery, SortOrder},
    services::order_service::{append_history, order_detail, order_from_entity},
    state::AppState,
};

pub async fn list_all_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination.normalize();

    let mut condition = Condition::all();
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

pub async fn get_order_admin(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderDetail>> {
    ensure_admin(user)?;
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".into()))?;

    let detail = order_detail(&state.orm, order).await?;
    Ok(ApiResponse::success("Order", detail))
}

pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    status: String,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(user)?;
    let next = OrderStatus::parse(&status)
        .ok_or_else(|| AppError::BadRequest("Invalid order status".into()))?;
    if next == OrderStatus::Cancelled {
        // Cancellation restores stock; that path owns the transition.
        return Err(AppError::BadRequest(
            "Use the cancel operation to cancel an order".into(),
        ));
    }

    let txn = state.orm.begin().await?;
    let existing = Orders::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".into()))?;

    let current = OrderStatus::parse(&existing.status)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("invalid stored status")))?;
    if current == OrderStatus::Cancelled {
        return Err(AppError::BadRequest(
            "Cancelled orders cannot change status".into(),
        ));
    }

    let now = Utc::now();
    let mut active: OrderActive = existing.into();
    active.status = Set(next.as_str().into());
    match next {
        OrderStatus::Shipped => active.shipped_at = Set(Some(now.into())),
        OrderStatus::Delivered => active.delivered_at = Set(Some(now.into())),
        _ => {}
    }
    active.updated_at = Set(now.into());
    let order = active.update(&txn).await?;

    if current != next {
        append_history(&txn, order.id, next.as_str(), None).await?;
    }
    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "order_status_update",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "status": order.status })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Order updated", order_from_entity(order)))
}

pub async fn update_payment_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payment_status: String,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(user)?;
    let next = PaymentStatus::parse(&payment_status)
        .ok_or_else(|| AppError::BadRequest("Invalid payment status".into()))?;

    let existing = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".into()))?;

    let now = Utc::now();
    let mut active: OrderActive = existing.into();
    active.payment_status = Set(next.as_str().into());
    if next == PaymentStatus::Paid {
        active.paid_at = Set(Some(now.into()));
    }
    active.updated_at = Set(now.into());
    let order = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "payment_status_update",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "payment_status": order.payment_status })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Payment status updated",
        order_from_entity(order),
    ))
}

#[derive(FromRow)]
struct StatusRow {
    status: String,
    count: i64,
    revenue: i64,
}

pub async fn get_order_stats(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<OrderStats>> {
    ensure_admin(user)?;

    let rows = sqlx::query_as::<_, StatusRow>(
        r#"
        SELECT status, COUNT(*) AS count, COALESCE(SUM(total), 0)::bigint AS revenue
        FROM orders
        GROUP BY status
        ORDER BY status
        "#,
    )
    .fetch_all(&state.pool)
    .await?;

    let totals: (i64, i64) = sqlx::query_as(
        r#"
        SELECT COUNT(*),
               COALESCE(SUM(total) FILTER (WHERE payment_status = 'paid'), 0)::bigint
        FROM orders
        "#,
    )
    .fetch_one(&state.pool)
    .await?;

    let stats = OrderStats {
        total_orders: totals.0,
        total_revenue: totals.1,
        by_status: rows
            .into_iter()
            .map(|row| StatusStat {
                status: row.status,
                count: row.count,
                revenue: row.revenue,
            })
            .collect(),
    };

    Ok(ApiResponse::success("Order stats", stats))
}

#[derive(FromRow)]
struct MonthRow {
    month: i32,
    orders: i64,
    revenue: i64,
}

/// Calendar-month sales over paid orders of the given year.
pub async fn monthly_sales(
    state: &AppState,
    user: &AuthUser,
    year: i32,
) -> AppResult<ApiResponse<MonthlySales>> {
    ensure_admin(user)?;

    let rows = sqlx::query_as::<_, MonthRow>(
        r#"
        SELECT EXTRACT(MONTH FROM created_at)::int AS month,
               COUNT(*) AS orders,
               COALESCE(SUM(total), 0)::bigint AS revenue
        FROM orders
        WHERE payment_status = 'paid'
          AND EXTRACT(YEAR FROM created_at)::int = $1
        GROUP BY month
        ORDER BY month
        "#,
    )
    .bind(year)
    .fetch_all(&state.pool)
    .await?;

    Ok(ApiResponse::success(
        "Monthly sales",
        MonthlySales {
            year,
            months: rows
                .into_iter()
                .map(|row| MonthlySale {
                    month: row.month,
                    orders: row.orders,
                    revenue: row.revenue,
                })
                .collect(),
        },
    ))
}
