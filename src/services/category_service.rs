use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    db::DbPool,
    dto::categories::{
        CategoryList, CategoryNode, CategoryTree, CreateCategoryRequest, UpdateCategoryRequest,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, sees_inactive},
    models::Category,
    response::{ApiResponse, Pagination},
    routes::params::Pagination as PageParams,
    services::slugify,
};

pub async fn list_categories(
    pool: &DbPool,
    user: Option<&AuthUser>,
    pagination: PageParams,
) -> AppResult<ApiResponse<CategoryList>> {
    let (page, limit, offset) = pagination.normalize();
    let all_visible = sees_inactive(user);

    let items = sqlx::query_as::<_, Category>(
        "SELECT * FROM categories WHERE ($1 OR is_active) ORDER BY name LIMIT $2 OFFSET $3",
    )
    .bind(all_visible)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM categories WHERE ($1 OR is_active)")
        .bind(all_visible)
        .fetch_one(pool)
        .await?;

    Ok(ApiResponse::paginated(
        "Categories",
        CategoryList { items },
        Pagination::new(page, limit, total.0),
    ))
}

pub async fn get_category(
    pool: &DbPool,
    user: Option<&AuthUser>,
    id: Uuid,
) -> AppResult<ApiResponse<Category>> {
    let category = sqlx::query_as::<_, Category>(
        "SELECT * FROM categories WHERE id = $1 AND ($2 OR is_active)",
    )
    .bind(id)
    .bind(sees_inactive(user))
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Category not found".into()))?;

    Ok(ApiResponse::success("Category", category))
}

pub async fn category_tree(
    pool: &DbPool,
    user: Option<&AuthUser>,
) -> AppResult<ApiResponse<CategoryTree>> {
    let all = sqlx::query_as::<_, Category>(
        "SELECT * FROM categories WHERE ($1 OR is_active) ORDER BY name",
    )
    .bind(sees_inactive(user))
    .fetch_all(pool)
    .await?;

    Ok(ApiResponse::success(
        "Category tree",
        CategoryTree {
            roots: build_tree(all),
        },
    ))
}

pub async fn create_category(
    pool: &DbPool,
    user: &AuthUser,
    payload: CreateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    let exist: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM categories WHERE name = $1")
        .bind(payload.name.as_str())
        .fetch_optional(pool)
        .await?;
    if exist.is_some() {
        return Err(AppError::BadRequest("name already exists".into()));
    }

    if let Some(parent_id) = payload.parent_id {
        let parent: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM categories WHERE id = $1")
            .bind(parent_id)
            .fetch_optional(pool)
            .await?;
        if parent.is_none() {
            return Err(AppError::BadRequest("Parent category not found".into()));
        }
    }

    let category = sqlx::query_as::<_, Category>(
        r#"
        INSERT INTO categories (id, name, slug, description, parent_id)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(payload.name.as_str())
    .bind(slugify(&payload.name))
    .bind(payload.description)
    .bind(payload.parent_id)
    .fetch_one(pool)
    .await?;

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "category_create",
        Some("categories"),
        Some(serde_json::json!({ "category_id": category.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Category created", category))
}

pub async fn update_category(
    pool: &DbPool,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    let existing = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".into()))?;

    if payload.parent_id == Some(id) {
        return Err(AppError::BadRequest("Category cannot be its own parent".into()));
    }

    let name = payload.name.unwrap_or(existing.name);
    let slug = slugify(&name);
    let description = payload.description.or(existing.description);
    let parent_id = payload.parent_id.or(existing.parent_id);

    let category = sqlx::query_as::<_, Category>(
        r#"
        UPDATE categories
        SET name = $2, slug = $3, description = $4, parent_id = $5, updated_at = $6
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(slug)
    .bind(description)
    .bind(parent_id)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "category_update",
        Some("categories"),
        Some(serde_json::json!({ "category_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Category updated", category))
}

pub async fn delete_category(
    pool: &DbPool,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let children: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM categories WHERE parent_id = $1")
            .bind(id)
            .fetch_one(pool)
            .await?;
    if children.0 > 0 {
        return Err(AppError::BadRequest(
            "Category has subcategories and cannot be deleted".into(),
        ));
    }

    let result = sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Category not found".into()));
    }

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "category_delete",
        Some("categories"),
        Some(serde_json::json!({ "category_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Category deleted", serde_json::json!({})))
}

pub async fn toggle_category(
    pool: &DbPool,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Category>> {
    let category = sqlx::query_as::<_, Category>(
        "UPDATE categories SET is_active = NOT is_active, updated_at = $2 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(Utc::now())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Category not found".into()))?;

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "category_toggle",
        Some("categories"),
        Some(serde_json::json!({ "category_id": id, "is_active": category.is_active })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Category toggled", category))
}

/// Materialize the parent/children hierarchy. Orphans (parent filtered out
/// or missing) surface as roots rather than being dropped.
fn build_tree(categories: Vec<Category>) -> Vec<CategoryNode> {
    let ids: std::collections::HashSet<Uuid> = categories.iter().map(|c| c.id).collect();
    let mut by_parent: HashMap<Option<Uuid>, Vec<Category>> = HashMap::new();
    for category in categories {
        let key = category.parent_id.filter(|p| ids.contains(p));
        by_parent.entry(key).or_default().push(category);
    }

    fn attach(
        parent: Option<Uuid>,
        by_parent: &mut HashMap<Option<Uuid>, Vec<Category>>,
    ) -> Vec<CategoryNode> {
        let Some(children) = by_parent.remove(&parent) else {
            return Vec::new();
        };
        children
            .into_iter()
            .map(|category| {
                let id = category.id;
                CategoryNode {
                    category,
                    children: attach(Some(id), by_parent),
                }
            })
            .collect()
    }

    attach(None, &mut by_parent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn category(id: Uuid, parent_id: Option<Uuid>, name: &str) -> Category {
        Category {
            id,
            name: name.to_string(),
            slug: slugify(name),
            description: None,
            parent_id,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn tree_nests_children_under_parents() {
        let root = Uuid::new_v4();
        let child = Uuid::new_v4();
        let grandchild = Uuid::new_v4();
        let tree = build_tree(vec![
            category(root, None, "Clothing"),
            category(child, Some(root), "Shirts"),
            category(grandchild, Some(child), "T-Shirts"),
        ]);

        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].children.len(), 1);
        assert_eq!(tree[0].children[0].children.len(), 1);
        assert_eq!(tree[0].children[0].children[0].category.id, grandchild);
    }

    #[test]
    fn orphaned_child_becomes_root() {
        let missing_parent = Uuid::new_v4();
        let orphan = Uuid::new_v4();
        let tree = build_tree(vec![category(orphan, Some(missing_parent), "Stranded")]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].category.id, orphan);
    }
}
