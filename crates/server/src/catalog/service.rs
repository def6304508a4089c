//! Catalog service: executes query plans and joins products with their
//! category for API responses.
//!
//! Referential rules live here: a product's category reference is resolved
//! before create, and again on update whenever the reference changes.
//! Validation happens before any mutation; not-found short-circuits.

use serde::Serialize;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use super::plan::QueryPlan;
use super::query_builder::CatalogQueryBuilder;
use crate::error::AppError;
use crate::models::product::Nutrition;
use crate::models::{Category, CreateProduct, Product, UpdateProduct};

/// Category summary embedded in product responses.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryRef {
    pub id: Uuid,
    pub name: String,

    /// Only populated on single-product reads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A product joined with its category summary.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogProduct {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub category: CategoryRef,
    pub images: Vec<String>,
    pub ingredients: Vec<String>,
    pub allergens: Vec<String>,
    pub is_active: bool,
    pub is_popular: bool,
    pub sort_order: i32,
    pub nutrition: Option<Nutrition>,
    pub created: i64,
    pub changed: i64,
}

impl CatalogProduct {
    fn from_parts(product: Product, category: CategoryRef) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price,
            category,
            images: product.images,
            ingredients: product.ingredients,
            allergens: product.allergens,
            is_active: product.is_active,
            is_popular: product.is_popular,
            sort_order: product.sort_order,
            nutrition: product.nutrition.map(|n| n.0),
            created: product.created,
            changed: product.changed,
        }
    }
}

/// Row shape returned by the listing query: product columns plus the joined
/// category name.
#[derive(Debug, sqlx::FromRow)]
struct ProductWithCategoryRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    price: f64,
    category_id: Uuid,
    images: Vec<String>,
    ingredients: Vec<String>,
    allergens: Vec<String>,
    is_active: bool,
    is_popular: bool,
    sort_order: i32,
    nutrition: Option<Json<Nutrition>>,
    created: i64,
    changed: i64,
    category_name: Option<String>,
}

impl From<ProductWithCategoryRow> for CatalogProduct {
    fn from(row: ProductWithCategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            category: CategoryRef {
                id: row.category_id,
                name: row.category_name.unwrap_or_default(),
                description: None,
            },
            images: row.images,
            ingredients: row.ingredients,
            allergens: row.allergens,
            is_active: row.is_active,
            is_popular: row.is_popular,
            sort_order: row.sort_order,
            nutrition: row.nutrition.map(|n| n.0),
            created: row.created,
            changed: row.changed,
        }
    }
}

/// One page of listing results plus pagination metadata.
#[derive(Debug, Clone, Serialize)]
pub struct ProductPage {
    pub items: Vec<CatalogProduct>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
    pub pages: u64,
}

impl ProductPage {
    /// Assemble a page with its derived page count.
    pub fn new(items: Vec<CatalogProduct>, total: i64, page: u32, per_page: u32) -> Self {
        let total_u = u64::try_from(total).unwrap_or(0);
        let pages = if per_page > 0 {
            total_u.div_ceil(u64::from(per_page))
        } else {
            // The plan compiler defaults per_page to a positive value; this
            // guard only protects hand-built plans.
            1
        };

        Self {
            items,
            total,
            page,
            per_page,
            pages,
        }
    }
}

/// Scoped listing result: all active products of one category.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryProducts {
    pub category: String,
    pub items: Vec<CatalogProduct>,
}

/// Catalog service over the product and category stores.
#[derive(Clone)]
pub struct CatalogService {
    pool: PgPool,
}

impl CatalogService {
    /// Create a new catalog service.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Execute a compiled plan: one COUNT for the total, one windowed SELECT
    /// joined with the category name.
    pub async fn list(&self, plan: &QueryPlan) -> Result<ProductPage, AppError> {
        let builder = CatalogQueryBuilder::new(plan.clone());

        let total: i64 = sqlx::query_scalar(&builder.build_count())
            .fetch_one(&self.pool)
            .await?;

        let rows: Vec<ProductWithCategoryRow> = sqlx::query_as(&builder.build())
            .fetch_all(&self.pool)
            .await?;

        let items = rows.into_iter().map(CatalogProduct::from).collect();

        Ok(ProductPage::new(items, total, plan.page, plan.per_page))
    }

    /// List all active products of one category, in menu order. The
    /// reference is format-checked before the existence lookup; this path
    /// takes no filter/sort/page parameters.
    pub async fn list_by_category(&self, category_id: &str) -> Result<CategoryProducts, AppError> {
        let category_id = parse_id(category_id, "category")?;

        let category = Category::find_by_id(&self.pool, category_id)
            .await?
            .ok_or_else(|| AppError::NotFound("category not found".into()))?;

        let products = Product::list_active_by_category(&self.pool, category_id).await?;

        let items = products
            .into_iter()
            .map(|product| {
                let category_ref = CategoryRef {
                    id: category.id,
                    name: category.name.clone(),
                    description: None,
                };
                CatalogProduct::from_parts(product, category_ref)
            })
            .collect();

        Ok(CategoryProducts {
            category: category.name,
            items,
        })
    }

    /// Fetch a single product joined with its category's name and
    /// description.
    pub async fn get(&self, id: &str) -> Result<CatalogProduct, AppError> {
        let id = parse_id(id, "product")?;

        let product = Product::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound("product not found".into()))?;

        let category = self.category_ref(product.category_id, true).await?;

        Ok(CatalogProduct::from_parts(product, category))
    }

    /// Create a product after resolving its category reference.
    pub async fn create(&self, input: CreateProduct) -> Result<CatalogProduct, AppError> {
        input.validate()?;

        let category_id = parse_id(&input.category_id, "category")?;
        let category = Category::find_by_id(&self.pool, category_id)
            .await?
            .ok_or_else(|| AppError::NotFound("category not found".into()))?;

        let product = Product::create(&self.pool, input, category_id).await?;

        Ok(CatalogProduct::from_parts(
            product,
            CategoryRef {
                id: category.id,
                name: category.name,
                description: None,
            },
        ))
    }

    /// Apply a partial update. A supplied category reference is re-validated
    /// exactly as on create; absent fields leave stored values untouched.
    pub async fn update(&self, id: &str, input: UpdateProduct) -> Result<CatalogProduct, AppError> {
        let id = parse_id(id, "product")?;
        input.validate()?;

        let current = Product::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound("product not found".into()))?;

        let category_id = match input.category_id.as_deref() {
            Some(raw) => {
                let category_id = parse_id(raw, "category")?;
                Category::find_by_id(&self.pool, category_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound("category not found".into()))?;
                category_id
            }
            None => current.category_id,
        };

        let merged = input.apply(current, category_id);
        let product = Product::update(&self.pool, &merged).await?;

        let category = self.category_ref(product.category_id, false).await?;

        Ok(CatalogProduct::from_parts(product, category))
    }

    /// Replace or extend a product's image list.
    pub async fn set_images(
        &self,
        id: &str,
        images: Vec<String>,
        replace: bool,
    ) -> Result<CatalogProduct, AppError> {
        let id = parse_id(id, "product")?;

        if images.is_empty() {
            return Err(AppError::BadRequest("at least one image is required".into()));
        }

        let current = Product::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound("product not found".into()))?;

        let images = if replace {
            images
        } else {
            let mut combined = current.images;
            combined.extend(images);
            combined
        };

        let product = Product::set_images(&self.pool, id, &images).await?;
        let category = self.category_ref(product.category_id, false).await?;

        Ok(CatalogProduct::from_parts(product, category))
    }

    /// Delete a product by identifier. No cascade; nothing references
    /// products.
    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        let id = parse_id(id, "product")?;

        let deleted = Product::delete(&self.pool, id).await?;
        if !deleted {
            return Err(AppError::NotFound("product not found".into()));
        }

        Ok(())
    }

    async fn category_ref(
        &self,
        category_id: Uuid,
        with_description: bool,
    ) -> Result<CategoryRef, AppError> {
        let category = Category::find_by_id(&self.pool, category_id).await?;

        Ok(match category {
            Some(category) => CategoryRef {
                id: category.id,
                name: category.name,
                description: if with_description {
                    category.description
                } else {
                    None
                },
            },
            // Dangling references cannot normally exist (FK restrict); keep
            // reads working if one does.
            None => CategoryRef {
                id: category_id,
                name: String::new(),
                description: None,
            },
        })
    }
}

fn parse_id(raw: &str, what: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::BadRequest(format!("invalid {what} id")))
}
