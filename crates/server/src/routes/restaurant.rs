//! Restaurant profile API routes.
//!
//! The profile is a single record created with defaults on first read;
//! updates are admin-only partial merges.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Json;
use axum::routing::{get, put};
use axum::Router;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::{Restaurant, UpdateRestaurant};
use crate::routes::helpers::require_admin;
use crate::state::AppState;

/// Create the restaurant router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/restaurant", get(get_restaurant))
        .route("/api/restaurant", put(update_restaurant))
        .route("/api/restaurant/logo", put(update_logo))
        .route("/api/restaurant/banner", put(update_banner))
}

#[derive(Serialize)]
struct ItemResponse {
    success: bool,
    data: Restaurant,
}

#[derive(Serialize)]
struct MutationResponse {
    success: bool,
    message: &'static str,
    data: Restaurant,
}

#[derive(Deserialize)]
struct UpdateImageRequest {
    url: String,
}

async fn get_restaurant(State(state): State<AppState>) -> Result<Json<ItemResponse>, AppError> {
    let restaurant = Restaurant::get_or_create(state.db()).await?;

    Ok(Json(ItemResponse {
        success: true,
        data: restaurant,
    }))
}

async fn update_restaurant(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<UpdateRestaurant>,
) -> Result<Json<MutationResponse>, AppError> {
    require_admin(&state, &headers).await?;
    input.validate()?;

    let restaurant = Restaurant::get_or_create(state.db()).await?;
    let merged = input.apply(restaurant);
    let restaurant = Restaurant::update(state.db(), &merged).await?;

    Ok(Json(MutationResponse {
        success: true,
        message: "restaurant profile updated",
        data: restaurant,
    }))
}

async fn update_logo(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<UpdateImageRequest>,
) -> Result<Json<MutationResponse>, AppError> {
    require_admin(&state, &headers).await?;

    if input.url.trim().is_empty() {
        return Err(AppError::BadRequest("logo url is required".into()));
    }

    let restaurant = Restaurant::find(state.db())
        .await?
        .ok_or_else(|| AppError::NotFound("restaurant profile not found".into()))?;

    let restaurant = Restaurant::set_logo(state.db(), restaurant.id, &input.url).await?;

    Ok(Json(MutationResponse {
        success: true,
        message: "logo updated",
        data: restaurant,
    }))
}

async fn update_banner(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<UpdateImageRequest>,
) -> Result<Json<MutationResponse>, AppError> {
    require_admin(&state, &headers).await?;

    if input.url.trim().is_empty() {
        return Err(AppError::BadRequest("banner url is required".into()));
    }

    let restaurant = Restaurant::find(state.db())
        .await?
        .ok_or_else(|| AppError::NotFound("restaurant profile not found".into()))?;

    let restaurant = Restaurant::set_banner(state.db(), restaurant.id, &input.url).await?;

    Ok(Json(MutationResponse {
        success: true,
        message: "banner updated",
        data: restaurant,
    }))
}
