use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::response::{ApiResponse, FieldError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("Database error")]
    Db(#[from] sqlx::Error),

    #[error("Database error")]
    Orm(#[from] sea_orm::DbErr),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

// Unique constraints we know about, mapped to the field name clients see.
const UNIQUE_CONSTRAINTS: [(&str, &str); 10] = [
    ("users_email_key", "email"),
    ("categories_name_key", "name"),
    ("categories_slug_key", "slug"),
    ("sizes_name_key", "name"),
    ("sizes_code_key", "code"),
    ("colors_name_key", "name"),
    ("colors_hex_code_key", "hex_code"),
    ("products_slug_key", "slug"),
    ("product_variants_sku_key", "sku"),
    ("wishlist_items_user_id_product_id_key", "product_id"),
];

fn duplicate_field(detail: &str) -> Option<&'static str> {
    UNIQUE_CONSTRAINTS
        .iter()
        .find(|(constraint, _)| detail.contains(constraint))
        .map(|(_, field)| *field)
}

/// Storage-level duplicate-key errors surface as 400 with a readable
/// message instead of leaking a driver error as a 500.
fn remap_db_error(err: &AppError) -> Option<String> {
    match err {
        AppError::Db(sqlx::Error::Database(db_err)) => {
            if db_err.is_unique_violation() {
                let field = db_err.constraint().and_then(duplicate_field).unwrap_or("value");
                Some(format!("{field} already exists"))
            } else if db_err.is_foreign_key_violation() {
                Some("Record is referenced by other records".to_string())
            } else {
                None
            }
        }
        AppError::Orm(db_err) => match db_err.sql_err() {
            Some(sea_orm::SqlErr::UniqueConstraintViolation(detail)) => {
                let field = duplicate_field(&detail).unwrap_or("value");
                Some(format!("{field} already exists"))
            }
            Some(sea_orm::SqlErr::ForeignKeyConstraintViolation(_)) => {
                Some("Record is referenced by other records".to_string())
            }
            _ => None,
        },
        _ => None,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(message) = remap_db_error(&self) {
            let body = ApiResponse::failure(message.clone(), message);
            return (StatusCode::BAD_REQUEST, axum::Json(body)).into_response();
        }

        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Db(_) | AppError::Orm(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = ?self, "unhandled error");
        }

        let body = match self {
            AppError::Validation(errors) => ApiResponse::invalid("Validation failed", errors),
            // Internal details are logged above, never returned to the client.
            other => ApiResponse::failure(other.to_string(), other.to_string()),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_field_matches_known_constraints() {
        assert_eq!(
            duplicate_field(r#"duplicate key value violates unique constraint "users_email_key""#),
            Some("email")
        );
        assert_eq!(
            duplicate_field(r#"violates unique constraint "product_variants_sku_key""#),
            Some("sku")
        );
        assert_eq!(duplicate_field("something else"), None);
    }
}
