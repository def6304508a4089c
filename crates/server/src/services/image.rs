//! Uploaded image processing and storage.
//!
//! Uploads are sniffed for a real image type, decoded, scaled down to fit
//! the display size without enlargement, re-encoded as JPEG, and written to
//! the uploads directory under a generated name.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;

/// Maximum accepted upload size (10 MB).
pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Maximum stored width.
const MAX_WIDTH: u32 = 800;

/// Maximum stored height.
const MAX_HEIGHT: u32 = 600;

/// JPEG quality for stored derivatives.
const JPEG_QUALITY: u8 = 85;

const ACCEPTED_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// A stored, optimized image.
#[derive(Debug, Clone, Serialize)]
pub struct StoredImage {
    pub filename: String,
    pub url: String,
    pub size: usize,
}

/// Image processing and storage service.
#[derive(Clone)]
pub struct ImageService {
    uploads_dir: PathBuf,
    files_url: String,
}

impl ImageService {
    /// Create an image service rooted at the uploads directory.
    pub fn new(uploads_dir: &Path, files_url: &str) -> Self {
        Self {
            uploads_dir: uploads_dir.to_path_buf(),
            files_url: files_url.trim_end_matches('/').to_string(),
        }
    }

    /// Validate, optimize, and store one uploaded image.
    pub async fn store_optimized(&self, data: Vec<u8>) -> Result<StoredImage, AppError> {
        if data.is_empty() {
            return Err(AppError::BadRequest("no file provided".into()));
        }
        if data.len() > MAX_UPLOAD_SIZE {
            return Err(AppError::BadRequest(format!(
                "file exceeds the {} MB upload limit",
                MAX_UPLOAD_SIZE / (1024 * 1024)
            )));
        }

        let kind = infer::get(&data)
            .ok_or_else(|| AppError::BadRequest("unrecognized file type".into()))?;
        if !ACCEPTED_TYPES.contains(&kind.mime_type()) {
            return Err(AppError::BadRequest(format!(
                "unsupported image type: {}",
                kind.mime_type()
            )));
        }

        // Decode/resize/encode are CPU-bound; keep them off the async workers.
        let encoded = tokio::task::spawn_blocking(move || -> Result<Vec<u8>> {
            let decoded = image::load_from_memory(&data).context("failed to decode image")?;
            let resized = fit_within(decoded, MAX_WIDTH, MAX_HEIGHT);

            let mut out = Vec::new();
            let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut out), JPEG_QUALITY);
            DynamicImage::ImageRgb8(resized.to_rgb8())
                .write_with_encoder(encoder)
                .context("failed to encode image")?;

            Ok(out)
        })
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("image task failed: {e}")))?
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let filename = format!("optimized-{}.jpg", Uuid::now_v7());
        let path = self.uploads_dir.join(&filename);

        tokio::fs::create_dir_all(&self.uploads_dir)
            .await
            .context("failed to create uploads directory")
            .map_err(AppError::Internal)?;

        let size = encoded.len();
        tokio::fs::write(&path, encoded)
            .await
            .context("failed to write image")
            .map_err(AppError::Internal)?;

        Ok(StoredImage {
            url: format!("{}/{}", self.files_url, filename),
            filename,
            size,
        })
    }

    /// Delete a stored image by filename.
    pub async fn delete(&self, filename: &str) -> Result<(), AppError> {
        if !is_safe_filename(filename) {
            return Err(AppError::BadRequest("invalid filename".into()));
        }

        let path = self.uploads_dir.join(filename);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::NotFound("file not found".into()))
            }
            Err(e) => Err(AppError::Internal(
                anyhow::Error::new(e).context("failed to delete file"),
            )),
        }
    }
}

/// Scale an image down to fit inside the given box, preserving aspect ratio.
/// Images already inside the box are returned unchanged.
fn fit_within(img: DynamicImage, max_width: u32, max_height: u32) -> DynamicImage {
    if img.width() <= max_width && img.height() <= max_height {
        return img;
    }
    img.resize(max_width, max_height, FilterType::Lanczos3)
}

/// Reject path separators, traversal, and control characters in filenames.
fn is_safe_filename(filename: &str) -> bool {
    !filename.is_empty()
        && !filename.contains('/')
        && !filename.contains('\\')
        && !filename.contains("..")
        && !filename.contains('\0')
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn small_images_are_not_enlarged() {
        let img = DynamicImage::new_rgb8(100, 80);
        let out = fit_within(img, MAX_WIDTH, MAX_HEIGHT);
        assert_eq!((out.width(), out.height()), (100, 80));
    }

    #[test]
    fn large_images_fit_inside_box() {
        let img = DynamicImage::new_rgb8(1600, 1200);
        let out = fit_within(img, MAX_WIDTH, MAX_HEIGHT);
        assert!(out.width() <= MAX_WIDTH);
        assert!(out.height() <= MAX_HEIGHT);
        assert_eq!((out.width(), out.height()), (800, 600));
    }

    #[test]
    fn aspect_ratio_is_preserved() {
        let img = DynamicImage::new_rgb8(2000, 500);
        let out = fit_within(img, MAX_WIDTH, MAX_HEIGHT);
        assert_eq!((out.width(), out.height()), (800, 200));
    }

    #[test]
    fn filename_sanitization() {
        assert!(is_safe_filename("optimized-abc.jpg"));
        assert!(!is_safe_filename(""));
        assert!(!is_safe_filename("../etc/passwd"));
        assert!(!is_safe_filename("a/b.jpg"));
        assert!(!is_safe_filename("a\\b.jpg"));
        assert!(!is_safe_filename("a\0b.jpg"));
    }
}
