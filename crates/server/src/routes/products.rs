//! Product API routes.
//!
//! Public listing, category-scoped listing, and single fetch; authenticated
//! create/update/delete for the admin panel.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use axum::routing::{delete, get, post, put};
use axum::Router;
use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogProduct, ListParams, QueryPlan};
use crate::error::AppError;
use crate::models::{CreateProduct, UpdateProduct};
use crate::routes::helpers::{require_admin, require_manager};
use crate::state::AppState;

/// Create the product router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(list_products))
        .route("/api/products", post(create_product))
        .route("/api/products/category/{category_id}", get(list_by_category))
        .route("/api/products/{id}", get(get_product))
        .route("/api/products/{id}", put(update_product))
        .route("/api/products/{id}", delete(delete_product))
        .route("/api/products/{id}/images", put(update_product_images))
}

// -------------------------------------------------------------------------
// Response types
// -------------------------------------------------------------------------

#[derive(Serialize)]
struct ListResponse {
    success: bool,
    count: usize,
    total: i64,
    page: u32,
    pages: u64,
    data: Vec<CatalogProduct>,
}

#[derive(Serialize)]
struct CategoryListResponse {
    success: bool,
    count: usize,
    category: String,
    data: Vec<CatalogProduct>,
}

#[derive(Serialize)]
struct ItemResponse {
    success: bool,
    data: CatalogProduct,
}

#[derive(Serialize)]
struct MutationResponse {
    success: bool,
    message: &'static str,
    data: CatalogProduct,
}

#[derive(Serialize)]
struct DeleteResponse {
    success: bool,
    message: &'static str,
}

// -------------------------------------------------------------------------
// Request types
// -------------------------------------------------------------------------

#[derive(Deserialize)]
struct UpdateImagesRequest {
    images: Vec<String>,

    #[serde(default)]
    replace: bool,
}

// -------------------------------------------------------------------------
// Handlers
// -------------------------------------------------------------------------

async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>, AppError> {
    let plan = QueryPlan::compile(&params);
    let page = state.catalog().list(&plan).await?;

    Ok(Json(ListResponse {
        success: true,
        count: page.items.len(),
        total: page.total,
        page: page.page,
        pages: page.pages,
        data: page.items,
    }))
}

async fn list_by_category(
    State(state): State<AppState>,
    Path(category_id): Path<String>,
) -> Result<Json<CategoryListResponse>, AppError> {
    let listing = state.catalog().list_by_category(&category_id).await?;

    Ok(Json(CategoryListResponse {
        success: true,
        count: listing.items.len(),
        category: listing.category,
        data: listing.items,
    }))
}

async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ItemResponse>, AppError> {
    let product = state.catalog().get(&id).await?;

    Ok(Json(ItemResponse {
        success: true,
        data: product,
    }))
}

async fn create_product(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<CreateProduct>,
) -> Result<(StatusCode, Json<MutationResponse>), AppError> {
    require_manager(&state, &headers).await?;

    let product = state.catalog().create(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(MutationResponse {
            success: true,
            message: "product created",
            data: product,
        }),
    ))
}

async fn update_product(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<UpdateProduct>,
) -> Result<Json<MutationResponse>, AppError> {
    require_manager(&state, &headers).await?;

    let product = state.catalog().update(&id, input).await?;

    Ok(Json(MutationResponse {
        success: true,
        message: "product updated",
        data: product,
    }))
}

async fn update_product_images(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<UpdateImagesRequest>,
) -> Result<Json<MutationResponse>, AppError> {
    require_manager(&state, &headers).await?;

    let product = state
        .catalog()
        .set_images(&id, input.images, input.replace)
        .await?;

    Ok(Json(MutationResponse {
        success: true,
        message: "product images updated",
        data: product,
    }))
}

async fn delete_product(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    require_admin(&state, &headers).await?;

    state.catalog().delete(&id).await?;

    Ok(Json(DeleteResponse {
        success: true,
        message: "product deleted",
    }))
}
