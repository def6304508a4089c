//! Menu category model and CRUD operations.
//!
//! Categories group products on the public menu. Names are unique among
//! categories (exact match as stored); duplicates are rejected with an
//! explicit pre-query so the caller gets a conflict rather than a raw
//! constraint violation.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;

/// Maximum length of a category name.
pub const MAX_NAME_LEN: usize = 100;

/// Maximum length of a category description.
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// A menu category.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    /// Unique identifier (UUIDv7).
    pub id: Uuid,

    /// Display name, unique among categories.
    pub name: String,

    /// Optional description.
    pub description: Option<String>,

    /// Optional image URL.
    pub image: Option<String>,

    /// Whether the category is shown on the public menu.
    pub is_active: bool,

    /// Sort position within the menu.
    pub sort_order: i32,

    /// Unix timestamp when created.
    pub created: i64,

    /// Unix timestamp when last changed.
    pub changed: i64,
}

/// Input for creating a category.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategory {
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
}

/// Input for updating a category.
///
/// Only fields present in the request are applied. Nullable fields use the
/// double-`Option` pattern so an explicit `null` clears the stored value
/// while an absent key leaves it untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCategory {
    pub name: Option<String>,

    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub description: Option<Option<String>>,

    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub image: Option<Option<String>>,

    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
}

fn validate_name(name: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::BadRequest("category name is required".into()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(AppError::BadRequest(format!(
            "category name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<(), AppError> {
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(AppError::BadRequest(format!(
            "category description must be at most {MAX_DESCRIPTION_LEN} characters"
        )));
    }
    Ok(())
}

impl CreateCategory {
    /// Validate field constraints before any store mutation.
    pub fn validate(&self) -> Result<(), AppError> {
        validate_name(&self.name)?;
        if let Some(ref description) = self.description {
            validate_description(description)?;
        }
        Ok(())
    }
}

impl UpdateCategory {
    /// Validate field constraints before any store mutation.
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(ref name) = self.name {
            validate_name(name)?;
        }
        if let Some(Some(ref description)) = self.description {
            validate_description(description)?;
        }
        Ok(())
    }

    /// Merge this partial update into an existing record.
    ///
    /// Fields absent from the request keep their current value; explicit
    /// nulls clear nullable fields. Timestamps are the caller's concern.
    pub fn apply(self, current: Category) -> Category {
        Category {
            id: current.id,
            name: self.name.unwrap_or(current.name),
            description: match self.description {
                Some(description) => description,
                None => current.description,
            },
            image: match self.image {
                Some(image) => image,
                None => current.image,
            },
            is_active: self.is_active.unwrap_or(current.is_active),
            sort_order: self.sort_order.unwrap_or(current.sort_order),
            created: current.created,
            changed: current.changed,
        }
    }
}

impl Category {
    /// Find a category by ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>> {
        let category = sqlx::query_as::<_, Self>("SELECT * FROM category WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .context("failed to fetch category")?;

        Ok(category)
    }

    /// Find a category by exact name.
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Self>> {
        let category = sqlx::query_as::<_, Self>("SELECT * FROM category WHERE name = $1")
            .bind(name)
            .fetch_optional(pool)
            .await
            .context("failed to fetch category by name")?;

        Ok(category)
    }

    /// Find a category by exact name, excluding a given ID (for rename checks).
    pub async fn find_by_name_excluding(
        pool: &PgPool,
        name: &str,
        exclude_id: Uuid,
    ) -> Result<Option<Self>> {
        let category =
            sqlx::query_as::<_, Self>("SELECT * FROM category WHERE name = $1 AND id <> $2")
                .bind(name)
                .bind(exclude_id)
                .fetch_optional(pool)
                .await
                .context("failed to fetch category by name")?;

        Ok(category)
    }

    /// List active categories in menu order.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<Self>> {
        let categories = sqlx::query_as::<_, Self>(
            "SELECT * FROM category WHERE is_active = TRUE ORDER BY sort_order, created",
        )
        .fetch_all(pool)
        .await
        .context("failed to list categories")?;

        Ok(categories)
    }

    /// Create a new category.
    pub async fn create(pool: &PgPool, input: CreateCategory) -> Result<Self> {
        let now = chrono::Utc::now().timestamp();
        let id = Uuid::now_v7();

        let category = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO category (id, name, description, image, is_active, sort_order, created, changed)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.image)
        .bind(input.is_active.unwrap_or(true))
        .bind(input.sort_order.unwrap_or(0))
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await
        .context("failed to create category")?;

        Ok(category)
    }

    /// Update a category from a merged record.
    pub async fn update(pool: &PgPool, merged: &Category) -> Result<Self> {
        let now = chrono::Utc::now().timestamp();

        let category = sqlx::query_as::<_, Self>(
            r#"
            UPDATE category
            SET name = $1, description = $2, image = $3, is_active = $4, sort_order = $5, changed = $6
            WHERE id = $7
            RETURNING *
            "#,
        )
        .bind(&merged.name)
        .bind(&merged.description)
        .bind(&merged.image)
        .bind(merged.is_active)
        .bind(merged.sort_order)
        .bind(now)
        .bind(merged.id)
        .fetch_one(pool)
        .await
        .context("failed to update category")?;

        Ok(category)
    }

    /// Delete a category.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM category WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .context("failed to delete category")?;

        Ok(result.rows_affected() > 0)
    }

    /// Count products referencing a category.
    pub async fn product_count(pool: &PgPool, id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM product WHERE category_id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
            .context("failed to count category products")?;

        Ok(count)
    }
}
