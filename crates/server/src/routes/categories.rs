//! Category API routes.
//!
//! Public listing and single fetch; authenticated create/update/delete for
//! the admin panel. Duplicate names are rejected with an explicit pre-query,
//! and a category still referenced by products cannot be deleted.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use axum::routing::{delete, get, post, put};
use axum::Router;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Category, CreateCategory, UpdateCategory};
use crate::routes::helpers::{require_admin, require_manager};
use crate::state::AppState;

/// Create the category router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/categories", get(list_categories))
        .route("/api/categories", post(create_category))
        .route("/api/categories/{id}", get(get_category))
        .route("/api/categories/{id}", put(update_category))
        .route("/api/categories/{id}", delete(delete_category))
        .route("/api/categories/{id}/image", put(update_category_image))
}

// -------------------------------------------------------------------------
// Response types
// -------------------------------------------------------------------------

#[derive(Serialize)]
struct ListResponse {
    success: bool,
    count: usize,
    data: Vec<Category>,
}

#[derive(Serialize)]
struct ItemResponse {
    success: bool,
    data: Category,
}

#[derive(Serialize)]
struct MutationResponse {
    success: bool,
    message: &'static str,
    data: Category,
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
struct UpdateImageRequest {
    image: String,
}

fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::BadRequest("invalid category id".into()))
}

// -------------------------------------------------------------------------
// Handlers
// -------------------------------------------------------------------------

async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<ListResponse>, AppError> {
    let categories = Category::list_active(state.db()).await?;

    Ok(Json(ListResponse {
        success: true,
        count: categories.len(),
        data: categories,
    }))
}

async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ItemResponse>, AppError> {
    let id = parse_id(&id)?;

    let category = Category::find_by_id(state.db(), id)
        .await?
        .ok_or_else(|| AppError::NotFound("category not found".into()))?;

    Ok(Json(ItemResponse {
        success: true,
        data: category,
    }))
}

async fn create_category(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<CreateCategory>,
) -> Result<(StatusCode, Json<MutationResponse>), AppError> {
    require_manager(&state, &headers).await?;
    input.validate()?;

    if Category::find_by_name(state.db(), &input.name).await?.is_some() {
        return Err(AppError::Conflict(
            "a category with this name already exists".into(),
        ));
    }

    let category = Category::create(state.db(), input).await?;

    Ok((
        StatusCode::CREATED,
        Json(MutationResponse {
            success: true,
            message: "category created",
            data: category,
        }),
    ))
}

async fn update_category(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<UpdateCategory>,
) -> Result<Json<MutationResponse>, AppError> {
    require_manager(&state, &headers).await?;
    let id = parse_id(&id)?;
    input.validate()?;

    let category = Category::find_by_id(state.db(), id)
        .await?
        .ok_or_else(|| AppError::NotFound("category not found".into()))?;

    if let Some(ref name) = input.name {
        if *name != category.name
            && Category::find_by_name_excluding(state.db(), name, id)
                .await?
                .is_some()
        {
            return Err(AppError::Conflict(
                "a category with this name already exists".into(),
            ));
        }
    }

    let merged = input.apply(category);
    let category = Category::update(state.db(), &merged).await?;

    Ok(Json(MutationResponse {
        success: true,
        message: "category updated",
        data: category,
    }))
}

async fn update_category_image(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<UpdateImageRequest>,
) -> Result<Json<MutationResponse>, AppError> {
    require_manager(&state, &headers).await?;
    let id = parse_id(&id)?;

    if input.image.trim().is_empty() {
        return Err(AppError::BadRequest("image url is required".into()));
    }

    let category = Category::find_by_id(state.db(), id)
        .await?
        .ok_or_else(|| AppError::NotFound("category not found".into()))?;

    let merged = UpdateCategory {
        image: Some(Some(input.image)),
        ..UpdateCategory::default()
    }
    .apply(category);
    let category = Category::update(state.db(), &merged).await?;

    Ok(Json(MutationResponse {
        success: true,
        message: "category image updated",
        data: category,
    }))
}

async fn delete_category(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    require_admin(&state, &headers).await?;
    let id = parse_id(&id)?;

    if Category::find_by_id(state.db(), id).await?.is_none() {
        return Err(AppError::NotFound("category not found".into()));
    }

    let dependents = Category::product_count(state.db(), id).await?;
    if dependents > 0 {
        return Err(AppError::Conflict(format!(
            "category still has {dependents} products; delete or reassign them first"
        )));
    }

    Category::delete(state.db(), id).await?;

    Ok(Json(DeleteResponse {
        success: true,
        message: "category deleted",
    }))
}
