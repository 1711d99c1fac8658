use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ImageStoreError {
    #[error("image not found")]
    NotFound,
    #[error("invalid filename")]
    InvalidFilename,
    #[error("unsupported image type: {0}")]
    UnsupportedType(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ImageStoreError {
    fn from_io(e: std::io::Error) -> Self {
        if e.kind() == ErrorKind::NotFound {
            Self::NotFound
        } else {
            Self::Io(e)
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StoredImage {
    pub filename: String,
    pub url: String,
    pub size: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageInfo {
    pub filename: String,
    pub url: String,
    pub size: i64,
    pub created_at: DateTime<Utc>,
}

const ALLOWED_TYPES: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
];

const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Filesystem-backed storage for model images, served under `/uploads`.
/// Files are named by a fresh UUID; models reference them by URL string only,
/// so a dangling reference is possible and readers must tolerate it.
pub struct ImageStore {
    base_path: PathBuf,
}

impl ImageStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            base_path: data_dir.join("uploads"),
        }
    }

    /// Writes the image and returns its metadata. The extension is derived
    /// from the declared content type; anything off the whitelist is refused.
    pub async fn store(
        &self,
        data: &[u8],
        content_type: &str,
    ) -> Result<StoredImage, ImageStoreError> {
        let ext = extension_for(content_type)
            .ok_or_else(|| ImageStoreError::UnsupportedType(content_type.to_string()))?;

        fs::create_dir_all(&self.base_path).await?;

        let filename = format!("{}.{ext}", Uuid::new_v4());
        let temp_path = self.base_path.join(format!(".tmp-{}", Uuid::new_v4()));

        let mut temp_file = File::create(&temp_path).await?;
        temp_file.write_all(data).await?;
        temp_file.sync_all().await?;

        fs::rename(&temp_path, self.base_path.join(&filename)).await?;

        Ok(StoredImage {
            url: url_for(&filename),
            filename,
            size: data.len() as i64,
        })
    }

    /// Absolute path of a stored image, after filename validation.
    pub fn path(&self, filename: &str) -> Result<PathBuf, ImageStoreError> {
        validate_filename(filename)?;
        Ok(self.base_path.join(filename))
    }

    pub async fn exists(&self, filename: &str) -> Result<bool, ImageStoreError> {
        Ok(self.path(filename)?.exists())
    }

    pub async fn remove(&self, filename: &str) -> Result<(), ImageStoreError> {
        let path = self.path(filename)?;
        fs::remove_file(&path).await.map_err(ImageStoreError::from_io)
    }

    /// All stored images, newest first.
    pub async fn list(&self) -> Result<Vec<ImageInfo>, ImageStoreError> {
        fs::create_dir_all(&self.base_path).await?;

        let mut images = Vec::new();
        let mut entries = fs::read_dir(&self.base_path).await?;
        while let Some(entry) = entries.next_entry().await? {
            let filename = entry.file_name().to_string_lossy().to_string();
            let ext = filename.rsplit('.').next().unwrap_or("").to_lowercase();
            if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
                continue;
            }

            let metadata = entry.metadata().await?;
            let created_at = metadata
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());

            images.push(ImageInfo {
                url: url_for(&filename),
                filename,
                size: metadata.len() as i64,
                created_at,
            });
        }

        images.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(images)
    }
}

#[must_use]
pub fn url_for(filename: &str) -> String {
    format!("/uploads/{filename}")
}

fn extension_for(content_type: &str) -> Option<&'static str> {
    ALLOWED_TYPES
        .iter()
        .find(|(ct, _)| *ct == content_type)
        .map(|(_, ext)| *ext)
}

fn validate_filename(filename: &str) -> Result<(), ImageStoreError> {
    if filename.is_empty()
        || filename.contains("..")
        || filename.contains('/')
        || filename.contains('\\')
    {
        return Err(ImageStoreError::InvalidFilename);
    }
    Ok(())
}
