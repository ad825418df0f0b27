//! Multipart intake and the per-request temporary image.

use crate::utils::error::{CardError, Result};
use axum::extract::Multipart;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

pub const IMAGE_FIELD: &str = "image";

/// An uploaded image on disk, owned by exactly one request.
///
/// The file is removed by [`TempImage::cleanup`] or, if the request is
/// dropped before reaching it, by `Drop`. Removal errors are logged and
/// never returned.
#[derive(Debug)]
pub struct TempImage {
    path: PathBuf,
    original_name: Option<String>,
    size: u64,
    armed: bool,
}

impl TempImage {
    pub fn new(path: PathBuf, original_name: Option<String>) -> Self {
        Self {
            path,
            original_name,
            size: 0,
            armed: true,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn original_name(&self) -> Option<&str> {
        self.original_name.as_deref()
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub async fn cleanup(mut self) {
        self.armed = false;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => tracing::debug!("Deleted temporary file {}", self.path.display()),
            Err(e) => report_cleanup_failure(&self.path, e),
        }
    }
}

impl Drop for TempImage {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!("Deleted abandoned temporary file {}", self.path.display()),
            Err(e) => report_cleanup_failure(&self.path, e),
        }
    }
}

fn report_cleanup_failure(path: &Path, source: std::io::Error) {
    if source.kind() == std::io::ErrorKind::NotFound {
        tracing::debug!("Temporary file {} already gone", path.display());
        return;
    }
    let err = CardError::CleanupFailure {
        path: path.to_path_buf(),
        source,
    };
    tracing::warn!("{}", err);
}

/// Streams the first file part named `image` into `dir`.
///
/// Other parts are skipped. Fails with [`CardError::NoFileUploaded`] when no
/// such part exists (nothing is written in that case) and with
/// [`CardError::FileTooLarge`] once more than `max_bytes` arrive, removing
/// the partial file.
pub async fn receive_image(multipart: &mut Multipart, dir: &Path, max_bytes: u64) -> Result<TempImage> {
    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) || field.file_name().is_none() {
            tracing::debug!("Skipping multipart field {:?}", field.name());
            continue;
        }

        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(format!("{}-upload", Uuid::new_v4()));

        // Declared before the file handle so the handle is closed first on drop.
        let mut image = TempImage::new(path, field.file_name().map(str::to_string));
        let mut file = tokio::fs::File::create(image.path()).await?;

        while let Some(chunk) = field.chunk().await? {
            image.size += chunk.len() as u64;
            if image.size > max_bytes {
                tracing::warn!("Upload rejected: more than {} bytes", max_bytes);
                return Err(CardError::FileTooLarge { limit: max_bytes });
            }
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        tracing::info!(
            "Stored upload {:?} ({} bytes) at {}",
            image.original_name().unwrap_or("<unnamed>"),
            image.size(),
            image.path().display()
        );
        return Ok(image);
    }

    Err(CardError::NoFileUploaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_cleanup_removes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("card-upload");
        std::fs::write(&path, b"png").unwrap();

        let image = TempImage::new(path.clone(), Some("card.png".to_string()));
        image.cleanup().await;
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_cleanup_of_missing_file_is_silent() {
        let dir = TempDir::new().unwrap();
        let image = TempImage::new(dir.path().join("never-written"), None);
        image.cleanup().await;
    }

    #[test]
    fn test_drop_removes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("card-upload");
        std::fs::write(&path, b"png").unwrap();

        {
            let _image = TempImage::new(path.clone(), None);
        }
        assert!(!path.exists());
    }
}
