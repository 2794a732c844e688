//! Durable storage for uploaded recipe images.
//!
//! Images are written under the uploads directory as `<uuid>.<ext>` and
//! identified by the reference `uploads/<uuid>.<ext>`, which is also the
//! path they are served under. The recipe core treats that reference as an
//! opaque string.

use std::path::{Component, Path, PathBuf};

use recipix_shared::constants::{IMAGE_EXTENSIONS, UPLOADS_PREFIX};
use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::ServerError;

/// Verify that a resolved path stays within the expected base directory.
fn ensure_within(base: &Path, target: &Path) -> Result<PathBuf, ServerError> {
    let canonical_base = base.canonicalize().unwrap_or_else(|_| base.to_path_buf());
    let mut resolved = canonical_base.clone();
    for component in target.strip_prefix(base).unwrap_or(target).components() {
        match component {
            Component::Normal(c) => resolved.push(c),
            Component::ParentDir => {
                return Err(ServerError::BadRequest("Path traversal detected".to_string()));
            }
            _ => {}
        }
    }
    if !resolved.starts_with(&canonical_base) {
        return Err(ServerError::BadRequest("Path traversal detected".to_string()));
    }
    Ok(resolved)
}

/// Lower-cased extension of `file_name` if it is an accepted image type.
pub fn image_extension(file_name: &str) -> Option<String> {
    let ext = Path::new(file_name).extension()?.to_str()?.to_ascii_lowercase();
    IMAGE_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

#[derive(Debug, Clone)]
pub struct ImageStore {
    base_path: PathBuf,
    max_size: usize,
}

impl ImageStore {
    pub async fn new(base_path: PathBuf, max_size: usize) -> Result<Self, ServerError> {
        fs::create_dir_all(&base_path).await.map_err(|e| {
            ServerError::ImageStorage(format!(
                "Failed to create uploads directory '{}': {}",
                base_path.display(),
                e
            ))
        })?;

        info!(path = %base_path.display(), "Image store initialized");

        Ok(Self {
            base_path,
            max_size,
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Store an uploaded image and return its reference.
    ///
    /// The original file name only decides the extension; the stored name is
    /// freshly generated so uploads never collide.
    pub async fn store_image(&self, original_name: &str, data: &[u8]) -> Result<String, ServerError> {
        let ext = image_extension(original_name).ok_or(ServerError::ImageRejected)?;
        if data.is_empty() {
            return Err(ServerError::BadRequest("Empty image upload".to_string()));
        }
        if data.len() > self.max_size {
            return Err(ServerError::ImageTooLarge {
                size: data.len(),
                max: self.max_size,
            });
        }

        let file_name = format!("{}.{}", Uuid::new_v4(), ext);
        let path = ensure_within(&self.base_path, &self.base_path.join(&file_name))?;

        fs::write(&path, data).await.map_err(|e| {
            ServerError::ImageStorage(format!("Failed to write image {}: {}", file_name, e))
        })?;

        debug!(file = %file_name, size = data.len(), "Stored image");
        Ok(format!("{UPLOADS_PREFIX}/{file_name}"))
    }

    /// Remove a previously stored image.
    pub async fn delete_image(&self, reference: &str) -> Result<(), ServerError> {
        let path = self.path_for_reference(reference)?;

        if !path.exists() {
            return Err(ServerError::NotFound(format!("Image not found: {reference}")));
        }

        fs::remove_file(&path).await.map_err(|e| {
            ServerError::ImageStorage(format!("Failed to delete image {}: {}", reference, e))
        })?;

        debug!(reference = %reference, "Deleted image");
        Ok(())
    }

    /// Map a reference handed out by [`store_image`](Self::store_image) back
    /// to its file, refusing anything outside the uploads directory.
    fn path_for_reference(&self, reference: &str) -> Result<PathBuf, ServerError> {
        let file_name = reference
            .strip_prefix(UPLOADS_PREFIX)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| ServerError::BadRequest(format!("Unknown image reference: {reference}")))?;

        if file_name.is_empty()
            || file_name.contains('/')
            || file_name.contains('\\')
            || file_name.contains("..")
        {
            return Err(ServerError::BadRequest("Path traversal detected".to_string()));
        }
        ensure_within(&self.base_path, &self.base_path.join(file_name))
    }
}
