use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Cart;

/// One line as submitted by the client. The `price` is only consulted when
/// merging duplicate lines in a full replace; the stored price always comes
/// from the catalog.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CartLineInput {
    pub product_id: Uuid,
    pub variant_id: Option<Uuid>,
    pub quantity: i32,
    pub price: Option<i64>,
}

/// `total_amount` is accepted for wire compatibility but ignored; the cart
/// total is recomputed from its lines on every save.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SaveCartRequest {
    pub total_amount: Option<i64>,
    pub items: Vec<CartLineInput>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RemoveItemQuery {
    pub variant_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VariantSummary {
    pub id: Uuid,
    pub sku: String,
    pub size: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartItemDetail {
    pub id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub slug: String,
    pub image: Option<String>,
    pub variant: Option<VariantSummary>,
    pub quantity: i32,
    pub price: i64,
    pub line_total: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartDetail {
    pub id: Option<Uuid>,
    pub items: Vec<CartItemDetail>,
    pub total_amount: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartIssue {
    pub product_id: Uuid,
    pub variant_id: Option<Uuid>,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartValidation {
    pub issues: Vec<CartIssue>,
    pub cart: CartDetail,
}

/// Admin view: every cart in the system.
#[derive(Debug, Serialize, ToSchema)]
pub struct CartList {
    pub items: Vec<Cart>,
}
