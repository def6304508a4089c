//! Image upload routes.
//!
//! Multipart uploads are optimized (resized and re-encoded) before storage;
//! responses carry the stored filename and public URL. All routes require a
//! manager.

use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::HeaderMap;
use axum::response::Json;
use axum::routing::{delete, post};
use axum::Router;
use serde::Serialize;

use crate::error::AppError;
use crate::routes::helpers::require_manager;
use crate::services::image::{StoredImage, MAX_UPLOAD_SIZE};
use crate::state::AppState;

/// Create the upload router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/upload/single", post(upload_single))
        .route("/api/upload/multiple", post(upload_multiple))
        .route("/api/upload/{filename}", delete(delete_upload))
        // Multipart bodies carry whole images; the per-file limit is checked
        // again by the image service.
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE * 4))
}

#[derive(Serialize)]
struct SingleResponse {
    success: bool,
    message: &'static str,
    data: StoredImage,
}

#[derive(Serialize)]
struct MultipleResponse {
    success: bool,
    message: &'static str,
    count: usize,
    data: Vec<StoredImage>,
}

#[derive(Serialize)]
struct DeleteResponse {
    success: bool,
    message: &'static str,
}

/// Collect the raw bytes of every file field in the request.
async fn collect_files(multipart: &mut Multipart) -> Result<Vec<Vec<u8>>, AppError> {
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("malformed multipart body: {e}")))?
    {
        if field.file_name().is_none() {
            continue;
        }
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("failed to read upload: {e}")))?;
        files.push(data.to_vec());
    }

    Ok(files)
}

async fn upload_single(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<SingleResponse>, AppError> {
    require_manager(&state, &headers).await?;

    let files = collect_files(&mut multipart).await?;
    let Some(data) = files.into_iter().next() else {
        return Err(AppError::BadRequest("no file provided".into()));
    };

    let stored = state.images().store_optimized(data).await?;

    Ok(Json(SingleResponse {
        success: true,
        message: "image uploaded",
        data: stored,
    }))
}

async fn upload_multiple(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<MultipleResponse>, AppError> {
    require_manager(&state, &headers).await?;

    let files = collect_files(&mut multipart).await?;
    if files.is_empty() {
        return Err(AppError::BadRequest("no file provided".into()));
    }

    let mut stored = Vec::with_capacity(files.len());
    for data in files {
        stored.push(state.images().store_optimized(data).await?);
    }

    Ok(Json(MultipleResponse {
        success: true,
        message: "images uploaded",
        count: stored.len(),
        data: stored,
    }))
}

async fn delete_upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(filename): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    require_manager(&state, &headers).await?;

    state.images().delete(&filename).await?;

    Ok(Json(DeleteResponse {
        success: true,
        message: "file deleted",
    }))
}
