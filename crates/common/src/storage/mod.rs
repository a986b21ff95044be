//! Uploaded media storage
//!
//! Airplane images are checked to really be images before anything is
//! written. The store only persists bytes and hands back a public URL;
//! pointing the airplane at it is the repository's job.

use crate::config::MediaConfig;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use image::ImageFormat;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

/// Directory under the media root that airplane images land in
pub const AIRPLANE_UPLOAD_DIR: &str = "uploads/airplanes";

/// Where an image ended up
#[derive(Debug, Clone)]
pub struct StoredImage {
    /// Public URL under the media prefix
    pub url: String,
    pub path: PathBuf,
    pub format: ImageFormat,
}

/// Storage backend for uploaded images
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Validate and persist an image. `name_hint` seeds the file name.
    async fn save(&self, name_hint: &str, bytes: Vec<u8>) -> Result<StoredImage>;
}

/// Decode `bytes` to make sure they hold a complete image
pub async fn inspect_image(bytes: Vec<u8>) -> Result<(Vec<u8>, ImageFormat)> {
    tokio::task::spawn_blocking(move || {
        let format = image::guess_format(&bytes).map_err(|_| AppError::InvalidImage)?;
        image::load_from_memory_with_format(&bytes, format).map_err(|_| AppError::InvalidImage)?;
        Ok((bytes, format))
    })
    .await
    .map_err(|e| AppError::Internal {
        message: format!("Image inspection task failed: {}", e),
    })?
}

/// Images on the local filesystem, served back by the gateway
#[derive(Debug, Clone)]
pub struct LocalImageStore {
    root: PathBuf,
    url_prefix: String,
}

impl LocalImageStore {
    pub fn new(config: &MediaConfig) -> Self {
        Self {
            root: PathBuf::from(&config.root),
            url_prefix: config.url_prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn save(&self, name_hint: &str, bytes: Vec<u8>) -> Result<StoredImage> {
        let (bytes, format) = inspect_image(bytes).await?;

        let extension = format.extensions_str().first().copied().unwrap_or("img");
        let file_name = format!("{}-{}.{}", slugify(name_hint), Uuid::new_v4(), extension);

        let dir = self.root.join(AIRPLANE_UPLOAD_DIR);
        fs::create_dir_all(&dir).await?;

        let path = dir.join(&file_name);
        fs::write(&path, &bytes).await?;

        debug!(path = %path.display(), bytes = bytes.len(), "Image stored");

        Ok(StoredImage {
            url: format!("{}/{}/{}", self.url_prefix, AIRPLANE_UPLOAD_DIR, file_name),
            path,
            format,
        })
    }
}

/// Lowercase ASCII slug; runs of anything else collapse to one `-`
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    for c in value.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }

    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "upload".to_string()
    } else {
        slug.to_string()
    }
}
