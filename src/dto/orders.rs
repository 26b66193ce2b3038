use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Order, OrderItem, StatusHistoryEntry};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub shipping_address_id: Uuid,
    pub payment_method: String,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CancelOrderRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderDetail {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub status_history: Vec<StatusHistoryEntry>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusStat {
    pub status: String,
    pub count: i64,
    pub revenue: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderStats {
    pub total_orders: i64,
    /// Revenue counts paid orders only.
    pub total_revenue: i64,
    pub by_status: Vec<StatusStat>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MonthlySale {
    pub month: i32,
    pub orders: i64,
    pub revenue: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MonthlySales {
    pub year: i32,
    pub months: Vec<MonthlySale>,
}
