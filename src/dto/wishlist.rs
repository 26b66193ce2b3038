use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Product;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddWishlistRequest {
    pub product_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WishlistList {
    pub items: Vec<Product>,
    pub count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WishlistCheck {
    pub in_wishlist: bool,
}
