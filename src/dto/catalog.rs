use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Color, Size};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSizeRequest {
    pub name: String,
    pub code: String,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSizeRequest {
    pub name: Option<String>,
    pub code: Option<String>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SizeList {
    pub items: Vec<Size>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateColorRequest {
    pub name: String,
    pub hex_code: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateColorRequest {
    pub name: Option<String>,
    pub hex_code: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ColorList {
    pub items: Vec<Color>,
}
