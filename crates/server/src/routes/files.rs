//! Uploaded file serving.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, Response, StatusCode};
use axum::routing::get;
use axum::Router;
use tokio::fs;
use tracing::warn;

use crate::state::AppState;

/// Create the uploads file-serving router.
pub fn router() -> Router<AppState> {
    Router::new().route("/uploads/{*path}", get(serve_upload))
}

/// Serve an uploaded file from the uploads directory.
async fn serve_upload(State(state): State<AppState>, Path(path): Path<String>) -> Response<Body> {
    // Security: prevent path traversal
    let path = path.trim_start_matches('/');
    if path.contains("..") || path.contains('\0') {
        return not_found();
    }

    let file_path = state.uploads_dir().join(path);

    let content = match fs::read(&file_path).await {
        Ok(content) => content,
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %file_path.display(), error = %e, "failed to read uploaded file");
            }
            return not_found();
        }
    };

    let content_type = mime_from_path(&file_path);

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CACHE_CONTROL, "public, max-age=86400")
        .body(Body::from(content));

    match response {
        Ok(response) => response,
        Err(_) => not_found(),
    }
}

fn not_found() -> Response<Body> {
    match Response::builder()
        .status(StatusCode::NOT_FOUND)
        .body(Body::from("not found"))
    {
        Ok(response) => response,
        Err(_) => Response::new(Body::empty()),
    }
}

/// Guess a content type from the file extension.
fn mime_from_path(path: &std::path::Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path as FsPath;

    #[test]
    fn mime_guesses() {
        assert_eq!(mime_from_path(FsPath::new("a.jpg")), "image/jpeg");
        assert_eq!(mime_from_path(FsPath::new("a.jpeg")), "image/jpeg");
        assert_eq!(mime_from_path(FsPath::new("a.png")), "image/png");
        assert_eq!(mime_from_path(FsPath::new("a.webp")), "image/webp");
        assert_eq!(mime_from_path(FsPath::new("a.bin")), "application/octet-stream");
        assert_eq!(mime_from_path(FsPath::new("noext")), "application/octet-stream");
    }
}
