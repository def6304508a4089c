//! Product model and CRUD operations.
//!
//! Products are the menu entries. Every product references exactly one
//! category; the reference is validated against the category store at create
//! time and again whenever an update supplies a new reference.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;

/// Maximum length of a product name.
pub const MAX_NAME_LEN: usize = 200;

/// Maximum length of a product description.
pub const MAX_DESCRIPTION_LEN: usize = 1000;

/// Optional nutrition facts attached to a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nutrition {
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
}

impl Nutrition {
    /// Every supplied value must be a finite non-negative number.
    pub fn validate(&self) -> Result<(), AppError> {
        let fields = [
            ("calories", self.calories),
            ("protein", self.protein),
            ("carbs", self.carbs),
            ("fat", self.fat),
        ];
        for (label, value) in fields {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(AppError::BadRequest(format!(
                        "nutrition {label} must be a non-negative number"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// A menu product.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    /// Unique identifier (UUIDv7).
    pub id: Uuid,

    /// Display name.
    pub name: String,

    /// Optional description.
    pub description: Option<String>,

    /// Price, never negative.
    pub price: f64,

    /// Owning category.
    pub category_id: Uuid,

    /// Ordered image URLs.
    pub images: Vec<String>,

    /// Ingredient list.
    pub ingredients: Vec<String>,

    /// Allergen list.
    pub allergens: Vec<String>,

    /// Whether the product is shown on the public menu.
    pub is_active: bool,

    /// Featured on the popular shelf.
    pub is_popular: bool,

    /// Sort position within its category.
    pub sort_order: i32,

    /// Optional nutrition facts.
    pub nutrition: Option<Json<Nutrition>>,

    /// Unix timestamp when created.
    pub created: i64,

    /// Unix timestamp when last changed.
    pub changed: i64,
}

/// Input for creating a product.
///
/// The category reference arrives as a raw string so a malformed value can be
/// reported as a bad request instead of a deserialization failure.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub category_id: String,
    pub images: Option<Vec<String>>,
    pub ingredients: Option<Vec<String>>,
    pub allergens: Option<Vec<String>>,
    pub is_active: Option<bool>,
    pub is_popular: Option<bool>,
    pub sort_order: Option<i32>,
    pub nutrition: Option<Nutrition>,
}

/// Input for updating a product.
///
/// Only fields present in the request are applied; presence is checked per
/// key, not per value. Nullable fields use the double-`Option` pattern so an
/// explicit `null` clears the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProduct {
    pub name: Option<String>,

    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub description: Option<Option<String>>,

    pub price: Option<f64>,
    pub category_id: Option<String>,
    pub images: Option<Vec<String>>,
    pub ingredients: Option<Vec<String>>,
    pub allergens: Option<Vec<String>>,
    pub is_active: Option<bool>,
    pub is_popular: Option<bool>,
    pub sort_order: Option<i32>,

    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub nutrition: Option<Option<Nutrition>>,
}

fn validate_name(name: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::BadRequest("product name is required".into()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(AppError::BadRequest(format!(
            "product name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<(), AppError> {
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(AppError::BadRequest(format!(
            "product description must be at most {MAX_DESCRIPTION_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_price(price: f64) -> Result<(), AppError> {
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::BadRequest(
            "price must be a non-negative number".into(),
        ));
    }
    Ok(())
}

impl CreateProduct {
    /// Validate field constraints before any store mutation.
    pub fn validate(&self) -> Result<(), AppError> {
        validate_name(&self.name)?;
        if let Some(ref description) = self.description {
            validate_description(description)?;
        }
        validate_price(self.price)?;
        if let Some(ref nutrition) = self.nutrition {
            nutrition.validate()?;
        }
        Ok(())
    }
}

impl UpdateProduct {
    /// Validate field constraints before any store mutation.
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(ref name) = self.name {
            validate_name(name)?;
        }
        if let Some(Some(ref description)) = self.description {
            validate_description(description)?;
        }
        if let Some(price) = self.price {
            validate_price(price)?;
        }
        if let Some(Some(ref nutrition)) = self.nutrition {
            nutrition.validate()?;
        }
        Ok(())
    }

    /// Merge this partial update into an existing record.
    ///
    /// The category reference is resolved by the caller (it needs an
    /// existence check) and passed in already parsed.
    pub fn apply(self, current: Product, category_id: Uuid) -> Product {
        Product {
            id: current.id,
            name: self.name.unwrap_or(current.name),
            description: match self.description {
                Some(description) => description,
                None => current.description,
            },
            price: self.price.unwrap_or(current.price),
            category_id,
            images: self.images.unwrap_or(current.images),
            ingredients: self.ingredients.unwrap_or(current.ingredients),
            allergens: self.allergens.unwrap_or(current.allergens),
            is_active: self.is_active.unwrap_or(current.is_active),
            is_popular: self.is_popular.unwrap_or(current.is_popular),
            sort_order: self.sort_order.unwrap_or(current.sort_order),
            nutrition: match self.nutrition {
                Some(nutrition) => nutrition.map(Json),
                None => current.nutrition,
            },
            created: current.created,
            changed: current.changed,
        }
    }
}

impl Product {
    /// Find a product by ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>> {
        let product = sqlx::query_as::<_, Self>("SELECT * FROM product WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .context("failed to fetch product")?;

        Ok(product)
    }

    /// List active products in a category, in menu order.
    pub async fn list_active_by_category(pool: &PgPool, category_id: Uuid) -> Result<Vec<Self>> {
        let products = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM product
            WHERE category_id = $1 AND is_active = TRUE
            ORDER BY sort_order, created DESC
            "#,
        )
        .bind(category_id)
        .fetch_all(pool)
        .await
        .context("failed to list products by category")?;

        Ok(products)
    }

    /// Create a new product. The category reference must already be resolved.
    pub async fn create(pool: &PgPool, input: CreateProduct, category_id: Uuid) -> Result<Self> {
        let now = chrono::Utc::now().timestamp();
        let id = Uuid::now_v7();

        let product = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO product
                (id, name, description, price, category_id, images, ingredients, allergens,
                 is_active, is_popular, sort_order, nutrition, created, changed)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(category_id)
        .bind(input.images.unwrap_or_default())
        .bind(input.ingredients.unwrap_or_default())
        .bind(input.allergens.unwrap_or_default())
        .bind(input.is_active.unwrap_or(true))
        .bind(input.is_popular.unwrap_or(false))
        .bind(input.sort_order.unwrap_or(0))
        .bind(input.nutrition.map(Json))
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await
        .context("failed to create product")?;

        Ok(product)
    }

    /// Update a product from a merged record.
    pub async fn update(pool: &PgPool, merged: &Product) -> Result<Self> {
        let now = chrono::Utc::now().timestamp();

        let product = sqlx::query_as::<_, Self>(
            r#"
            UPDATE product
            SET name = $1, description = $2, price = $3, category_id = $4, images = $5,
                ingredients = $6, allergens = $7, is_active = $8, is_popular = $9,
                sort_order = $10, nutrition = $11, changed = $12
            WHERE id = $13
            RETURNING *
            "#,
        )
        .bind(&merged.name)
        .bind(&merged.description)
        .bind(merged.price)
        .bind(merged.category_id)
        .bind(&merged.images)
        .bind(&merged.ingredients)
        .bind(&merged.allergens)
        .bind(merged.is_active)
        .bind(merged.is_popular)
        .bind(merged.sort_order)
        .bind(merged.nutrition.as_ref())
        .bind(now)
        .bind(merged.id)
        .fetch_one(pool)
        .await
        .context("failed to update product")?;

        Ok(product)
    }

    /// Replace or extend a product's image list.
    pub async fn set_images(pool: &PgPool, id: Uuid, images: &[String]) -> Result<Self> {
        let now = chrono::Utc::now().timestamp();

        let product = sqlx::query_as::<_, Self>(
            "UPDATE product SET images = $1, changed = $2 WHERE id = $3 RETURNING *",
        )
        .bind(images)
        .bind(now)
        .bind(id)
        .fetch_one(pool)
        .await
        .context("failed to update product images")?;

        Ok(product)
    }

    /// Delete a product.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM product WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .context("failed to delete product")?;

        Ok(result.rows_affected() > 0)
    }
}
