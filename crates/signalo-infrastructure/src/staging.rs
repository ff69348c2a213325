//! Local image staging.
//!
//! Picked images are copied into the app cache directory under a fresh name
//! before upload, so the upload survives the source file moving or the
//! picker's temp location being reclaimed mid-flight.

use std::path::{Path, PathBuf};

use signalo_core::error::{Result, SignaloError};
use uuid::Uuid;

use crate::paths::SignaloPaths;

/// Stages image files into a private cache directory.
pub struct ImageStaging {
    dir: PathBuf,
}

impl ImageStaging {
    /// Creates a staging area at the default cache location.
    pub fn new() -> Result<Self> {
        let dir = SignaloPaths::staging_dir()
            .map_err(|e| SignaloError::storage(format!("cannot resolve staging dir: {e}")))?;
        Ok(Self { dir })
    }

    /// Creates a staging area rooted at a custom directory (for testing).
    pub fn with_dir(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Copies `source` into the staging directory and returns the staged
    /// path. The staged name is fresh per call; staging the same source
    /// twice yields two independent copies.
    pub async fn stage(&self, source: &Path) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let extension = source
            .extension()
            .map(|ext| ext.to_string_lossy().to_string())
            .unwrap_or_else(|| "jpg".to_string());
        let staged = self.dir.join(format!("{}.{}", Uuid::new_v4(), extension));

        tokio::fs::copy(source, &staged).await?;
        tracing::debug!(staged = %staged.display(), "image staged for upload");
        Ok(staged)
    }

    /// Removes every staged copy (screen teardown).
    pub async fn clear(&self) -> Result<()> {
        if tokio::fs::try_exists(&self.dir).await? {
            tokio::fs::remove_dir_all(&self.dir).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_stage_copies_the_file() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("photo.jpg");
        tokio::fs::write(&source, b"jpegdata").await.unwrap();

        let staging = ImageStaging::with_dir(temp_dir.path().join("staged"));
        let staged = staging.stage(&source).await.unwrap();

        assert!(staged.exists());
        assert_eq!(tokio::fs::read(&staged).await.unwrap(), b"jpegdata");
        assert_eq!(staged.extension().unwrap(), "jpg");
    }

    #[tokio::test]
    async fn test_staging_twice_yields_distinct_copies() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("photo.jpg");
        tokio::fs::write(&source, b"jpegdata").await.unwrap();

        let staging = ImageStaging::with_dir(temp_dir.path().join("staged"));
        let first = staging.stage(&source).await.unwrap();
        let second = staging.stage(&source).await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_clear_removes_staged_copies() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("photo.jpg");
        tokio::fs::write(&source, b"jpegdata").await.unwrap();

        let staging = ImageStaging::with_dir(temp_dir.path().join("staged"));
        let staged = staging.stage(&source).await.unwrap();
        staging.clear().await.unwrap();
        assert!(!staged.exists());

        // Clearing an already-empty area is fine.
        staging.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_source_is_a_storage_error() {
        let temp_dir = TempDir::new().unwrap();
        let staging = ImageStaging::with_dir(temp_dir.path().join("staged"));
        let err = staging
            .stage(&temp_dir.path().join("nope.jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, SignaloError::Storage { .. }));
    }
}
