//! Application state shared across all handlers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::catalog::CatalogService;
use crate::config::Config;
use crate::db;
use crate::services::image::ImageService;
use crate::services::token::TokenService;

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// PostgreSQL connection pool.
    db: PgPool,

    /// Catalog service over the product and category stores.
    catalog: CatalogService,

    /// Admin session token service.
    tokens: TokenService,

    /// Image processing and storage service.
    images: ImageService,

    /// Uploads directory on disk.
    uploads_dir: PathBuf,
}

impl AppState {
    /// Create new application state with database connections.
    pub async fn new(config: &Config) -> Result<Self> {
        let db = db::create_pool(config)
            .await
            .context("failed to create database pool")?;

        db::run_migrations(&db)
            .await
            .context("failed to run migrations")?;

        let catalog = CatalogService::new(db.clone());
        let tokens = TokenService::new(config.jwt_secret.as_bytes());
        let images = ImageService::new(&config.uploads_dir, &config.files_url);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                db,
                catalog,
                tokens,
                images,
                uploads_dir: config.uploads_dir.clone(),
            }),
        })
    }

    /// Get the database pool.
    pub fn db(&self) -> &PgPool {
        &self.inner.db
    }

    /// Get the catalog service.
    pub fn catalog(&self) -> &CatalogService {
        &self.inner.catalog
    }

    /// Get the token service.
    pub fn tokens(&self) -> &TokenService {
        &self.inner.tokens
    }

    /// Get the image service.
    pub fn images(&self) -> &ImageService {
        &self.inner.images
    }

    /// Get the uploads directory path.
    pub fn uploads_dir(&self) -> &Path {
        &self.inner.uploads_dir
    }

    /// Check if PostgreSQL is healthy.
    pub async fn postgres_healthy(&self) -> bool {
        db::check_health(&self.inner.db).await
    }
}
